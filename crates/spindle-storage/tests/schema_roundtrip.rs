//! Property tests: the compact schema form parses back to the same tree, and
//! printing is idempotent after the first round.

use proptest::prelude::*;

use spindle_storage::{dense, fixed, replicated, sparse, values, TreeLevel};

fn arb_schema() -> impl Strategy<Value = TreeLevel> {
    // A chain of up to 6 non-terminal levels over values().
    prop::collection::vec(0..4u8, 0..6).prop_map(|levels| {
        let mut schema = values();
        for l in levels {
            schema = match l {
                0 => dense(schema),
                1 => sparse(schema),
                2 => fixed(schema),
                _ => replicated(schema),
            };
        }
        schema
    })
}

proptest! {
    #[test]
    fn print_parse_round_trips(schema in arb_schema()) {
        let text = schema.to_string();
        let reparsed: TreeLevel = text.parse().unwrap();
        prop_assert_eq!(&reparsed, &schema);
        prop_assert_eq!(reparsed.to_string(), text);
    }

    #[test]
    fn order_counts_non_terminals(schema in arb_schema()) {
        let text = schema.to_string();
        let keywords = text.matches('(').count();
        prop_assert_eq!(schema.order() + 1, keywords);
    }

    #[test]
    fn parser_never_panics(input in "\\PC{0,40}") {
        let _ = input.parse::<TreeLevel>();
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};

use spindle_backend_c::CodeGen;
use spindle_ir::{Arena, Expr, Function, LoopKind, ScalarType, Stmt};
use spindle_jit::Module;
use spindle_storage::{Dimension, FormatRegistry, TreeLevel};

/// Spindle: sparse-tensor kernel compiler
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Tree-format schema to inspect, e.g. "dense(sparse(values()))"
    #[arg(long)]
    schema: Option<String>,

    /// Demo kernel to emit: copy or scale
    #[arg(long)]
    demo: Option<String>,

    /// Emit the demo loop with a clang vectorize pragma of this width
    #[arg(long)]
    vectorize: Option<u32>,

    /// Compile, load, and run the demo kernel after emitting it
    #[arg(long)]
    jit: bool,

    /// Write emitted C to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List all registered mode formats and exit
    #[arg(long)]
    list_formats: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

const DEMO_LEN: i64 = 4;

/// Builds the named demo kernel: `B[i] = A[i]` (copy) or `B[i] = A[i] * 2.0`
/// (scale) over `DEMO_LEN` doubles.
fn build_demo(name: &str, vectorize: Option<u32>) -> miette::Result<Function> {
    let mut f = Function::new(name);
    let a = f.exprs.ptr("A", ScalarType::Double);
    let b = f.exprs.ptr("B", ScalarType::Double);
    let i = f.exprs.var("i", ScalarType::Int);
    let zero = f.exprs.int(0);
    let n = f.exprs.int(DEMO_LEN);
    let one = f.exprs.int(1);
    let load = f.exprs.load(a, i);

    let value = match name {
        "copy" => load,
        "scale" => {
            let two = f.exprs.append(Expr::DoubleImm(2.0));
            f.exprs.mul(load, two)
        }
        other => {
            return Err(miette::miette!(
                "unknown demo kernel '{other}' (available: copy, scale)"
            ))
        }
    };

    f.inputs.push(a);
    f.outputs.push(b);
    let (kind, vec_width) = match vectorize {
        Some(w) => (LoopKind::Vectorized, w),
        None => (LoopKind::Serial, 0),
    };
    f.body = Stmt::Block(vec![Stmt::For {
        var: i,
        start: zero,
        end: n,
        increment: one,
        kind,
        vec_width,
        body: Box::new(Stmt::Store {
            base: b,
            index: i,
            value,
        }),
    }]);
    f.validate().into_diagnostic()?;
    Ok(f)
}

fn inspect_schema(text: &str) -> miette::Result<()> {
    let schema: TreeLevel = text
        .parse()
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("schema parse failed")?;

    println!("{schema}");
    print!("{}", schema.pretty());

    let mut exprs: Arena<Expr> = Arena::new();
    let tensor = exprs.ptr("A", ScalarType::Double);
    let dims = vec![Dimension::Dynamic(None); schema.order()];
    let storage = schema.bind(tensor, &dims);
    println!("order {}", storage.order());
    for (_, mode) in storage.modes() {
        println!(
            "  level {}: {} (pack {} of {})",
            mode.level(),
            mode.mode_type().name(),
            mode.pack().0,
            storage.pack(mode.pack()).len()
        );
    }
    Ok(())
}

fn run_demo(func: &Function, text: &str) -> miette::Result<()> {
    let mut module = Module::new(text);
    module
        .compile()
        .into_diagnostic()
        .wrap_err("JIT compilation failed")?;
    let sym = module.get_func(&func.name).into_diagnostic()?;

    let kernel: unsafe extern "C" fn(*const f64, *mut f64) -> i32 =
        unsafe { std::mem::transmute(sym) };
    let a = [1.0, 2.0, 3.0, 4.0];
    let mut b = [0.0f64; DEMO_LEN as usize];
    let rc = unsafe { kernel(a.as_ptr(), b.as_mut_ptr()) };
    println!("{}(A) returned {rc}; B = {b:?}", func.name);
    Ok(())
}

fn run() -> miette::Result<()> {
    env_logger::try_init().ok();

    let cli = Cli::parse();

    // --list-formats: print registered mode formats and exit.
    if cli.list_formats {
        let registry = FormatRegistry::with_builtins();
        for name in registry.list_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(schema) = &cli.schema {
        inspect_schema(schema)?;
    }

    if let Some(demo) = &cli.demo {
        let func = build_demo(demo, cli.vectorize)?;
        let text = CodeGen::new().compile(&func);

        match &cli.output {
            Some(path) => std::fs::write(path, &text)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to write {}", path.display()))?,
            None => print!("{text}"),
        }

        if cli.jit {
            run_demo(&func, &text)?;
        }
    } else if cli.schema.is_none() {
        return Err(miette::miette!(
            "nothing to do: pass --schema and/or --demo (see --help)"
        ));
    }

    Ok(())
}

//! Entrypoint for CLI
mod config;
mod error;

use std::{
    env,
    error::Error,
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    thread,
    time::Instant,
};

use config::CompilerConf;
use error::AppError;
use jack_compiler::{
    compile::CodeGen,
    lex::tokenize,
    parse_str, write_vm,
    xml::{tokens_to_xml, tree_to_xml},
    JackError,
};
use log::{debug, error, info, warn, LevelFilter};

static USAGE: &str = r#"
usage: jackc [OPTIONS] PATH

Compiles a .jack file, or every .jack file in a directory,
into .vm files named after each source file.

options:
    --tokens        Also write the token sequence to <Name>T.xml
    --tree          Also write the syntax tree to <Name>.xml
    --config FILE   Read configuration from FILE instead of jack.yaml
    --out DIR       Write output files to DIR
    -h, --help      Print this message

examples:
    jackc Square
    jackc --tree --out build Main.jack
"#;

const SOURCE_EXT: &str = "jack";
const OUTPUT_EXT: &str = "vm";

/// Stack size of compile workers. Deeply nested sources are
/// rejected by the parser well before this is exhausted.
const WORKER_STACK: usize = 16 * 1024 * 1024;

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let args = match parse_args(env::args().skip(1)) {
        Some(args) => args,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    let mut conf = CompilerConf::load(args.config.as_deref())?;
    conf.emit_tokens |= args.tokens;
    conf.emit_tree |= args.tree;
    if args.out_dir.is_some() {
        conf.out_dir = args.out_dir.clone();
    }
    debug!("{conf:?}");

    if let Some(out_dir) = &conf.out_dir {
        fs::create_dir_all(out_dir)?;
    }

    let units = find_units(&args.path)?;
    if units.is_empty() {
        warn!("no .{SOURCE_EXT} files found in {}", args.path.display());
        return Ok(());
    }

    let start = Instant::now();
    let failed = compile_all(&units, &conf);
    info!(
        "compiled {} of {} units in {}ms",
        units.len() - failed,
        units.len(),
        start.elapsed().as_millis()
    );

    if failed > 0 {
        std::process::exit(1)
    }

    Ok(())
}

/// Source files to compile, sorted by name.
fn find_units(path: &Path) -> Result<Vec<PathBuf>, AppError> {
    if path.is_dir() {
        let mut units = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && is_source(&entry_path) {
                units.push(entry_path);
            }
        }
        units.sort();
        Ok(units)
    } else if path.is_file() && is_source(path) {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(AppError::invalid_input(path))
    }
}

fn is_source(path: &Path) -> bool {
    path.extension().map(|ext| ext == SOURCE_EXT).unwrap_or(false)
}

/// Compile every unit on a bounded number of worker threads.
///
/// Units share nothing, so a failed unit is logged and the
/// others carry on. Returns the number of failed units.
fn compile_all(units: &[PathBuf], conf: &CompilerConf) -> usize {
    let next = AtomicUsize::new(0);
    let failed = Mutex::new(Vec::new());
    let workers = conf.jobs.get().min(units.len());

    let work = || {
        while let Some(path) = units.get(next.fetch_add(1, Ordering::Relaxed)) {
            if let Err(err) = compile_unit(path, conf) {
                error!("{err}");
                if let Ok(mut failed) = failed.lock() {
                    failed.push(path.clone());
                }
            }
        }
    };

    thread::scope(|scope| {
        for id in 0..workers {
            let spawned = thread::Builder::new()
                .name(format!("jackc-{id}"))
                .stack_size(WORKER_STACK)
                .spawn_scoped(scope, work);
            if let Err(err) = spawned {
                error!("failed to spawn worker: {err}");
                // The remaining units are drained on this thread.
                work();
                break;
            }
        }
    });

    match failed.into_inner() {
        Ok(failed) => failed.len(),
        // A worker panicked while holding the lock.
        Err(_) => units.len(),
    }
}

/// Output file named after the unit's stem.
///
/// The suffix is appended to the whole stem so dotted
/// names like `Foo.v2` keep every part.
fn output_file(out_dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    out_dir.join(format!("{stem}{suffix}"))
}

fn write_file(path: &Path, contents: String) -> Result<(), AppError> {
    fs::write(path, contents).map_err(|err| AppError::file(path, err))?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn compile_unit(path: &Path, conf: &CompilerConf) -> Result<(), AppError> {
    let unit = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|err| AppError::file(path, err))?;
    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
    let out_dir = match &conf.out_dir {
        Some(dir) => dir.as_path(),
        None => path.parent().unwrap_or_else(|| Path::new(".")),
    };

    info!("compiling {unit}");

    if conf.emit_tokens {
        let tokens = tokenize(&source).map_err(|err| JackError::new(&unit, &source, err))?;
        write_file(&output_file(out_dir, stem, "T.xml"), tokens_to_xml(&tokens, &source))?;
    }

    let tree = parse_str(&unit, &source)?;

    let class_name = tree.class.name.as_str();
    if class_name != stem {
        warn!("{unit}: class {class_name} is declared in a file named {stem}");
    }

    if conf.emit_tree {
        write_file(&output_file(out_dir, stem, ".xml"), tree_to_xml(&tree, &source))?;
    }

    let code = CodeGen::new()
        .compile(&tree)
        .map_err(|err| JackError::new(&unit, &source, err))?;

    let out_path = output_file(out_dir, stem, &format!(".{OUTPUT_EXT}"));
    fs::File::create(&out_path)
        .and_then(|file| write_vm(&code, BufWriter::new(file)))
        .map_err(|err| AppError::file(&out_path, err))?;
    info!("wrote {} instructions to {}", code.len(), out_path.display());

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    tokens: bool,
    tree: bool,
    config: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    path: PathBuf,
}

/// Returns `None` when the usage text should be printed instead.
fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut parsed = Args::default();
    let mut path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => parsed.tokens = true,
            "--tree" => parsed.tree = true,
            "--config" => parsed.config = Some(args.next()?.into()),
            "--out" => parsed.out_dir = Some(args.next()?.into()),
            "-h" | "--help" => return None,
            flag if flag.starts_with('-') => return None,
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }

    parsed.path = path?;
    Some(parsed)
}

fn print_usage() {
    println!("jackc v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(line: &str) -> Option<Args> {
        parse_args(line.split_whitespace().map(String::from))
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(
            args("--tree --out build Square"),
            Some(Args {
                tree: true,
                out_dir: Some("build".into()),
                path: "Square".into(),
                ..Default::default()
            })
        );
        assert_eq!(
            args("Main.jack --tokens --config ci.yaml"),
            Some(Args {
                tokens: true,
                config: Some("ci.yaml".into()),
                path: "Main.jack".into(),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_parse_args_usage() {
        assert_eq!(args(""), None);
        assert_eq!(args("--help"), None);
        assert_eq!(args("--out"), None);
        assert_eq!(args("--verbose Main.jack"), None);
        assert_eq!(args("A.jack B.jack"), None);
    }

    #[test]
    fn test_is_source() {
        assert!(is_source(Path::new("dir/Main.jack")));
        assert!(!is_source(Path::new("dir/Main.vm")));
        assert!(!is_source(Path::new("jack")));
    }

    #[test]
    fn test_output_file_keeps_dotted_stem() {
        let dir = Path::new("build");
        assert_eq!(output_file(dir, "Foo.v2", ".vm"), PathBuf::from("build/Foo.v2.vm"));
        assert_eq!(output_file(dir, "Foo.v2", "T.xml"), PathBuf::from("build/Foo.v2T.xml"));
        assert_eq!(output_file(dir, "Main", ".vm"), PathBuf::from("build/Main.vm"));
    }

    #[test]
    fn test_missing_unit_names_path() {
        let path = Path::new("no-such-dir/Missing.jack");
        let err = compile_unit(path, &CompilerConf::default()).unwrap_err();
        assert!(matches!(err.kind, error::ErrorKind::File(ref at, _) if at == path));
        assert!(err.to_string().starts_with("no-such-dir/Missing.jack: "), "{err}");
    }
}

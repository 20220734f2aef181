use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use goplay_core::{CompileResult, Playground, PlaygroundConfig};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Exit status when the submitted program failed to build.
const EXIT_COMPILE_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[clap(name = "goplay", author, version, about = "Fetch and run Go playground snippets")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(
        long,
        env = "GOPLAY_COMPILE_URL",
        help = "Compile endpoint to submit programs to"
    )]
    compile_url: Option<String>,

    #[clap(long, help = "Abort requests that take longer than this many seconds")]
    timeout_secs: Option<u64>,

    #[clap(long, short, default_value = "warn")]
    log_level: String,

    #[clap(long, help = "Print the compile result as JSON")]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the code behind a shared snippet link
    Fetch { link: String },
    /// Compile and run a program from a file, or stdin when omitted or '-'
    Compile { file: Option<PathBuf> },
    /// Fetch a shared snippet and run it
    Run { link: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .target(env_logger::Target::Stderr)
        .init();

    let playground = Playground::new(build_config(&cli)?)?;

    match &cli.command {
        Commands::Fetch { link } => {
            let code = playground
                .fetch(link)
                .await
                .with_context(|| format!("failed to fetch {}", link))?;
            print!("{}", code);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compile { file } => {
            let code = read_source(file.as_ref(), tokio::io::stdin()).await?;
            let result = playground.compile(&code).await?;
            emit(&result, cli.json)
        }
        Commands::Run { link } => {
            let code = playground
                .fetch(link)
                .await
                .with_context(|| format!("failed to fetch {}", link))?;
            log::info!("Fetched {} bytes from {}", code.len(), link);
            let result = playground.compile(&code).await?;
            emit(&result, cli.json)
        }
    }
}

fn build_config(cli: &Cli) -> Result<PlaygroundConfig> {
    let mut config = PlaygroundConfig::from_env()?;
    if let Some(url) = &cli.compile_url {
        config = config.with_compile_url(url.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn read_source<R>(file: Option<&PathBuf>, mut stdin: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    match file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            stdin
                .read_to_string(&mut code)
                .await
                .context("failed to read program from stdin")?;
            Ok(code)
        }
    }
}

fn emit(result: &CompileResult, json: bool) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    report(result, json, &mut stdout.lock(), &mut stderr.lock())?;
    Ok(ExitCode::from(exit_status(result)))
}

fn report(
    result: &CompileResult,
    json: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
    } else if result.is_compile_error() {
        write!(err, "{}", result.errors)?;
    } else {
        write!(out, "{}", result.stdout)?;
        write!(err, "{}", result.stderr)?;
    }
    out.flush()?;
    err.flush()?;
    Ok(())
}

fn exit_status(result: &CompileResult) -> u8 {
    if result.is_compile_error() {
        EXIT_COMPILE_ERROR
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_global_flags() {
        let cli = Cli::try_parse_from([
            "goplay",
            "--timeout-secs",
            "10",
            "--json",
            "run",
            "https://play.golang.org/p/abc",
        ])
        .unwrap();

        assert_eq!(cli.timeout_secs, Some(10));
        assert!(cli.json);
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Commands::Run { link } => assert_eq!(link, "https://play.golang.org/p/abc"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_compile_without_file_reads_stdin() {
        let cli = Cli::try_parse_from(["goplay", "compile"]).unwrap();
        assert!(matches!(cli.command, Commands::Compile { file: None }));
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["goplay"]).is_err());
    }

    fn render(result: &CompileResult, json: bool) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        report(result, json, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_report_splits_streams() {
        let result = CompileResult {
            errors: String::new(),
            stdout: "hello\n".to_string(),
            stderr: "warning\n".to_string(),
        };
        assert_eq!(
            render(&result, false),
            ("hello\n".to_string(), "warning\n".to_string())
        );

        let failed = CompileResult::compile_error("prog.go:3: undefined: foo\n");
        assert_eq!(
            render(&failed, false),
            (String::new(), "prog.go:3: undefined: foo\n".to_string())
        );
    }

    #[test]
    fn test_report_json_goes_to_stdout() {
        let failed = CompileResult::compile_error("undefined: foo");
        let (out, err) = render(&failed, true);
        assert!(err.is_empty());

        let decoded: CompileResult = serde_json::from_str(&out).unwrap();
        assert_eq!(decoded, failed);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["errors"], "undefined: foo");
        assert_eq!(value["stdout"], "");
        assert_eq!(value["stderr"], "");
    }

    #[tokio::test]
    async fn test_read_source_from_stdin() {
        let stdin: &[u8] = b"package main\n";
        assert_eq!(read_source(None, stdin).await.unwrap(), "package main\n");

        let dash = PathBuf::from("-");
        let stdin: &[u8] = b"func main() {}";
        assert_eq!(
            read_source(Some(&dash), stdin).await.unwrap(),
            "func main() {}"
        );
    }

    #[tokio::test]
    async fn test_read_source_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "package main\n\nfunc main() {{}}\n").unwrap();
        let path = file.path().to_path_buf();

        let stdin: &[u8] = b"ignored";
        assert_eq!(
            read_source(Some(&path), stdin).await.unwrap(),
            "package main\n\nfunc main() {}\n"
        );
    }

    #[tokio::test]
    async fn test_read_source_missing_file() {
        let path = PathBuf::from("/nonexistent/goplay/prog.go");
        let err = read_source(Some(&path), tokio::io::empty())
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to read /nonexistent/goplay/prog.go"));
    }

    #[test]
    fn test_exit_status() {
        let ok = CompileResult {
            errors: String::new(),
            stdout: "hello\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(exit_status(&ok), 0);

        let failed = CompileResult::compile_error("undefined: foo");
        assert_eq!(exit_status(&failed), EXIT_COMPILE_ERROR);
    }
}

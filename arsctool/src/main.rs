use anyhow::{Context, Result};
use arsc::document::Resolver;
use arsc::edit;
use arsc::event::NullSink;
use arsc::stream::ResourceStream;
use arsc::table::{TableAttributeMatcher, TableToDocument};
use arsc::xml::{XmlElementMatcher, XmlToDocument};
use arsc::ResourceDecoder;
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

/// Decode and patch compiled Android resources: resource tables
/// (resources.arsc) and compiled binary XML such as AndroidManifest.xml.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Resource file to read or modify
    #[clap(long, value_name = "FILE")]
    file: PathBuf,
    /// Pretty-print the decoded file to stdout
    #[clap(long)]
    dump: bool,
    /// Assign a value to a resource, e.g. -R R.bool.checked=false
    #[clap(short = 'R', value_name = "RESOURCE=VALUE")]
    resource: Vec<String>,
    /// Remove XML elements matching a selector,
    /// e.g. -X 'application[android:debuggable=true]'
    #[clap(short = 'X', value_name = "PATTERN")]
    remove: Vec<String>,
    /// Properties file mapping platform resource ids to names, consulted
    /// when resolving references during --dump
    #[clap(long, value_name = "FILE")]
    ids: Option<PathBuf>,
}

fn main() -> ExitCode {
    use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
    tracing_log::LogTracer::init().ok();
    let env = std::env::var("ARSC_LOG").unwrap_or_else(|_| "info".into());
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_span_events(FmtSpan::ACTIVE | FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::new(env))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            err.print().ok();
            return ExitCode::from(code);
        }
    };
    if !args.dump && args.resource.is_empty() && args.remove.is_empty() {
        tracing::error!("nothing to do: pass --dump, -R or -X");
        return ExitCode::from(1);
    }
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

/// Filter chain: document builders in front, matchers behind them.
type Chain =
    TableToDocument<XmlToDocument<XmlElementMatcher<TableAttributeMatcher<NullSink>>>>;

fn run(args: Args) -> Result<ExitCode> {
    let assignments = parse_assignments(&args.resource)?;
    let patterns = assignments.iter().map(|(name, _)| name.clone());

    let mut chain: Chain = TableToDocument::new(XmlToDocument::new(XmlElementMatcher::new(
        args.remove.clone(),
        TableAttributeMatcher::new(patterns, NullSink),
    )?));

    tracing::info!("reading {}", args.file.display());
    let file = File::open(&args.file)
        .with_context(|| format!("opening {}", args.file.display()))?;
    let mut stream = ResourceStream::new(BufReader::new(file));
    let mut decoder = ResourceDecoder::new(&mut chain);
    while decoder.decode(&mut stream)?.is_some() {}
    drop(decoder);

    if args.dump {
        dump(&args, &chain)?;
    }

    if !assignments.is_empty() {
        let matcher = chain.next().next().next();
        let unmatched = matcher.unmatched();
        if let Err(err) = edit::check_resolved(&unmatched) {
            tracing::error!("{err}");
            return Ok(ExitCode::from(2));
        }
        tracing::info!("updating {}", args.file.display());
        let mut file = open_rw(&args.file)?;
        edit::apply_value_edits(&mut file, &assignments, matcher.matches())?;
    }

    let xml_matcher = chain.next().next();
    if !xml_matcher.selectors().is_empty() {
        let selectors = xml_matcher
            .selectors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if xml_matcher.changes().is_empty() {
            tracing::info!("no elements match {selectors}");
        } else {
            tracing::info!("removing elements {selectors} from {}", args.file.display());
            let mut file = open_rw(&args.file)?;
            edit::apply_resize_edits(&mut file, xml_matcher.changes().iter().copied())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn dump(args: &Args, chain: &Chain) -> Result<()> {
    let stdout = std::io::stdout();
    if let Some(document) = chain.document() {
        let mut resolver = Resolver::new();
        resolver.extend(chain.declarations().clone());
        if let Some(path) = &args.ids {
            let ids = File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            resolver.extend(Resolver::load_properties(BufReader::new(ids))?);
        }
        let unresolved = resolver.unresolved(chain.references());
        if !unresolved.is_empty() {
            tracing::info!("unresolved resource ids: {}", unresolved.join(", "));
        }
        document.write_xml(stdout.lock(), Some(&resolver))?;
    }
    if let Some(document) = chain.next().document() {
        document.write_xml(stdout.lock(), None)?;
    }
    Ok(())
}

fn parse_assignments(specs: &[String]) -> Result<Vec<(String, String)>> {
    specs
        .iter()
        .map(|spec| {
            spec.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .with_context(|| format!("expected RESOURCE=VALUE, got {spec}"))
        })
        .collect()
}

fn open_rw(path: &PathBuf) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("opening {} for writing", path.display()))
}

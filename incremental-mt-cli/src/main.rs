use clap::{Arg, ArgAction, Command};
use incremental_mt::{
    EngineConfig, FinalizationPolicy, Fragment, GoogleTranslateProvider, IncrementalTranslator,
    MachineTranslator, MockMode, MockTranslator, UpdateMessage, UpdateType, load_config_from_file,
};
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("incremental-mt")
        .version("0.1.0")
        .about("Replay a stream of source fragments through the incremental translator")
        .arg(
            Arg::new("input")
                .help("JSON-lines file with one inbound update message per line ('-' for stdin)")
                .index(1)
                .required_unless_present("simulate"),
        )
        .arg(
            Arg::new("simulate")
                .long("simulate")
                .help("Synthesize a word-by-word stream from this sentence instead of reading input")
                .conflicts_with("input"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Engine configuration file (JSON)"),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .help("Source language code (default: en)"),
        )
        .arg(
            Arg::new("target-locale")
                .long("target")
                .short('t')
                .help("Target language code (default: de)"),
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .help("Finalization policy")
                .value_parser(["operation", "flag"]),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .help("Fail oracle calls that take longer than this")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Mock translation mode")
                .value_parser(["suffix", "noop", "reorder"])
                .default_value("suffix"),
        )
        .arg(
            Arg::new("dictionary")
                .long("dictionary")
                .short('d')
                .help("JSON object mapping exact source texts to translations for the mock"),
        )
        .arg(
            Arg::new("google")
                .long("google")
                .help("Use Google Translate (needs GOOGLE_TRANSLATE_API_KEY)")
                .action(ArgAction::SetTrue)
                .conflicts_with("dictionary"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every reconciliation pass")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    // 1. Configuration: file first, flags override
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => load_config_from_file(Path::new(path))?,
        None => EngineConfig::default(),
    };
    if let Some(source) = matches.get_one::<String>("source-locale") {
        config.source_language = source.clone();
    }
    if let Some(target) = matches.get_one::<String>("target-locale") {
        config.target_language = target.clone();
    }
    if let Some(policy) = matches.get_one::<String>("policy") {
        config.finalization = policy.parse()?;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout-ms") {
        config.oracle_timeout_ms = Some(*timeout);
    }

    // 2. Oracle
    let translator: Arc<dyn MachineTranslator> = if matches.get_flag("google") {
        Arc::new(GoogleTranslateProvider::from_env()?)
    } else if let Some(path) = matches.get_one::<String>("dictionary") {
        Arc::new(load_dictionary(Path::new(path), &config.target_language)?)
    } else {
        let mode = match matches.get_one::<String>("mock").map(String::as_str) {
            Some("noop") => MockMode::NoOp,
            Some("reorder") => MockMode::Reorder,
            _ => MockMode::Suffix,
        };
        Arc::new(MockTranslator::new(mode))
    };

    let mut engine = IncrementalTranslator::from_config(&config, translator)?;

    // 3. Inbound stream
    let messages = match matches.get_one::<String>("simulate") {
        Some(sentence) => simulate(sentence, config.finalization),
        None => {
            let input = matches
                .get_one::<String>("input")
                .ok_or("an input file or --simulate is required")?;
            read_messages(input)?
        }
    };

    // 4. Reconcile and print outbound messages
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted = 0usize;
    for message in messages {
        if let Some(outbound) = engine.process_update(message)? {
            serde_json::to_writer(&mut out, &outbound)?;
            writeln!(out)?;
            emitted += 1;
        }
    }

    info!(
        oracle_calls = engine.oracle_calls(),
        messages = emitted,
        "stream finished"
    );
    Ok(())
}

/// Mapping mock from a `{"source text": "translation"}` JSON file
fn load_dictionary(path: &Path, target_locale: &str) -> Result<MockTranslator, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read dictionary '{}': {}", path.display(), e))?;
    let entries: HashMap<String, String> = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse dictionary '{}': {}", path.display(), e))?;

    let mappings = entries
        .into_iter()
        .map(|(text, translation)| ((text, target_locale.to_string()), translation))
        .collect();
    Ok(MockTranslator::new(MockMode::Mappings(mappings)))
}

fn read_messages(input: &str) -> Result<Vec<UpdateMessage<Fragment>>, Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(fs::File::open(input).map_err(|e| {
            format!("Failed to open input '{}': {}", input, e)
        })?))
    };

    let mut messages = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let message = serde_json::from_str(&line)
            .map_err(|e| format!("Line {}: {}", line_no + 1, e))?;
        messages.push(message);
    }
    Ok(messages)
}

/// Word-by-word stream the way an incremental recognizer would produce it
///
/// One ADD per word; the utterance ends with a COMMIT of every word, or, under the
/// flag policy, with the last word carrying the terminal flag.
fn simulate(sentence: &str, policy: FinalizationPolicy) -> Vec<UpdateMessage<Fragment>> {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    let mut messages: Vec<UpdateMessage<Fragment>> = words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let fragment = if policy == FinalizationPolicy::FlagBased && i == last {
                Fragment::terminal(i as u64, *word)
            } else {
                Fragment::new(i as u64, *word)
            };
            UpdateMessage::from_unit(fragment, UpdateType::Add)
        })
        .collect();

    if policy == FinalizationPolicy::OperationBased && !words.is_empty() {
        messages.push(
            words
                .iter()
                .enumerate()
                .map(|(i, word)| (Fragment::new(i as u64, *word), UpdateType::Commit))
                .collect(),
        );
    }
    messages
}

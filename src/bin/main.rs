use clap::{Arg, ArgAction, Command};
use cvforge::config::{self, ConfigSource};
use cvforge::{
    CanonicalDocument, Dispatcher, LabelKey, Labels, OutputFormat, PhotoAsset, RenderError,
    Rendered,
};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const RC_FILE: &str = "cvforgerc.toml";

#[derive(Debug)]
enum AppError {
    FileReadError(String, std::io::Error),
    FileWriteError(String, std::io::Error),
    InvalidArgument(String),
    RenderFailed(RenderError),
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::RenderFailed(e)
    }
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

fn get_document_input(matches: &clap::ArgMatches) -> Result<String, AppError> {
    if let Some(file_path) = matches.get_one::<String>("path") {
        fs::read_to_string(file_path).map_err(|e| AppError::FileReadError(file_path.clone(), e))
    } else if let Some(json) = matches.get_one::<String>("string") {
        Ok(json.to_string())
    } else {
        Err(AppError::InvalidArgument("No input provided".to_string()))
    }
}

/// Get the configuration source based on CLI arguments or default behavior.
///
/// Priority order:
/// 1. If `--config` is explicitly provided, use that file
/// 2. If `cvforgerc.toml` exists in current directory, use it
/// 3. Otherwise use default configuration
fn get_config_source(matches: &clap::ArgMatches) -> ConfigSource<'_> {
    if let Some(config_file) = matches.get_one::<String>("config") {
        return ConfigSource::File(config_file.as_str());
    }
    if Path::new(RC_FILE).exists() {
        return ConfigSource::File(RC_FILE);
    }
    ConfigSource::Default
}

fn get_output_dir(matches: &clap::ArgMatches) -> Result<PathBuf, AppError> {
    let current_dir = std::env::current_dir()
        .map_err(|e| AppError::InvalidArgument(format!("Cannot resolve current directory: {}", e)))?;
    Ok(matches
        .get_one::<String>("output-dir")
        .map(|p| current_dir.join(p))
        .unwrap_or(current_dir))
}

/// Parses one `--label KEY=VALUE` argument. Keys are the label map keys, e.g.
/// `sectionSkills`.
fn parse_label(raw: &str) -> Result<(LabelKey, String), AppError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::InvalidArgument(format!("Label '{}' is not KEY=VALUE", raw)))?;
    let key = LabelKey::from_key(key.trim()).ok_or_else(|| {
        let known: Vec<&str> = LabelKey::ALL.iter().map(|k| k.as_str()).collect();
        AppError::InvalidArgument(format!(
            "Unknown label key '{}' (expected one of: {})",
            key.trim(),
            known.join(", ")
        ))
    })?;
    Ok((key, value.to_string()))
}

fn get_labels(matches: &clap::ArgMatches) -> Result<Labels, AppError> {
    let mut labels = Labels::new();
    if let Some(values) = matches.get_many::<String>("label") {
        for raw in values {
            let (key, value) = parse_label(raw)?;
            labels.set(key, value);
        }
    }
    Ok(labels)
}

fn get_photo(matches: &clap::ArgMatches) -> Result<Option<PhotoAsset>, AppError> {
    let Some(path) = matches.get_one::<String>("photo") else {
        return Ok(None);
    };
    let bytes = fs::read(path).map_err(|e| AppError::FileReadError(path.clone(), e))?;
    Ok(Some(PhotoAsset::from_bytes(bytes)?))
}

fn run(matches: clap::ArgMatches) -> Result<(), AppError> {
    let verbosity = if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let input = get_document_input(&matches)?;
    let doc = CanonicalDocument::from_json(&input)?;
    let template = matches
        .get_one::<String>("template")
        .cloned()
        .unwrap_or_else(|| doc.template.as_str().to_string());
    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("page")
        .parse()?;
    let labels = get_labels(&matches)?;
    let photo = get_photo(&matches)?;
    let output_dir = get_output_dir(&matches)?;
    if !output_dir.is_dir() {
        return Err(AppError::InvalidArgument(format!(
            "Output directory {} does not exist",
            output_dir.display()
        )));
    }

    let dispatcher = Dispatcher::new(config::load_config_from_source(get_config_source(&matches)));
    debug!("Rendering template '{}' as {}", template, format);

    let (file_name, bytes) = match format {
        OutputFormat::Page => {
            let (file, report) =
                dispatcher.render_page_with_report(&doc, &template, &labels, photo.as_ref())?;
            if !report.is_complete() && verbosity != Verbosity::Quiet {
                if !report.overflow.is_empty() {
                    warn!(
                        "{} block(s) did not fit the page and were clipped; set [page] overflow = \"continue\" to paginate",
                        report.overflow.len()
                    );
                }
                if !report.missing_glyphs.is_empty() {
                    warn!(
                        "{} character(s) could not be drawn; set a TrueType family under [fonts] that covers them",
                        report.missing_glyphs.len()
                    );
                }
            }
            (file.file_name, file.bytes)
        }
        other => match dispatcher.render(&doc, &template, other.as_str(), &labels, photo.as_ref())? {
            Rendered::Preview(tree) => (
                cvforge::output_file_name(&doc.personal_info.name, OutputFormat::Preview),
                tree.to_html().into_bytes(),
            ),
            Rendered::Binary(file) => (file.file_name, file.bytes),
        },
    };

    let output_path = output_dir.join(&file_name);
    fs::write(&output_path, &bytes)
        .map_err(|e| AppError::FileWriteError(output_path.display().to_string(), e))?;

    if verbosity != Verbosity::Quiet {
        println!("Saved {} to {}", format, output_path.display());
        if verbosity == Verbosity::Verbose {
            let size_kb = bytes.len() as f64 / 1024.0;
            println!("   Template: {}", template);
            println!("   Size: {:.1} KB", size_kb);
        }
    }
    info!("Wrote {} bytes to {}", bytes.len(), output_path.display());
    Ok(())
}

fn build_command() -> Command {
    Command::new("cvforge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a JSON résumé to PDF, DOCX or an HTML preview")
        .after_help(
            "EXAMPLES:\n  \
            cvforge -p resume.json\n  \
            cvforge -p resume.json -t creative --photo me.jpg\n  \
            cvforge -p resume.json -f docx -o out --label sectionSkills=Kenntnisse\n",
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .value_name("FILE_PATH")
                .help("Path to the JSON résumé document")
                .conflicts_with("string"),
        )
        .arg(
            Arg::new("string")
                .short('s')
                .long("string")
                .value_name("JSON")
                .help("JSON résumé document as a string")
                .conflicts_with("path"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("TEMPLATE")
                .help("Template id (defaults to the document's own template)"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format: page (pdf), docx or preview (default: page)"),
        )
        .arg(
            Arg::new("photo")
                .long("photo")
                .value_name("IMAGE")
                .help("Portrait photo for templates with a portrait slot"),
        )
        .arg(
            Arg::new("label")
                .short('l')
                .long("label")
                .value_name("KEY=VALUE")
                .help("Section label override, e.g. sectionSkills=Kenntnisse (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory to write the output into (defaults to the current directory)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG_FILE")
                .help("Path to configuration file (TOML format). Auto-detects cvforgerc.toml if not specified"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show detailed output")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress all output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("list-templates")
                .long("list-templates")
                .help("List registered templates and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("get-default-configuration")
                .long("get-default-configuration")
                .help("Print a default cvforgerc.toml to stdout and exit")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    // Initialize logger with environment variable control (RUST_LOG)
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let mut cmd = build_command();
    let matches = cmd.clone().get_matches();

    if matches.get_flag("list-templates") {
        for style in cvforge::templates::all() {
            println!("{:<10} {}", style.id.as_str(), style.display_name);
        }
        process::exit(0);
    }

    if matches.get_flag("get-default-configuration") {
        println!("{}", config::default_config_toml());
        process::exit(0);
    }

    if !matches.contains_id("path") && !matches.contains_id("string") {
        let _ = cmd.print_help();
        println!();
        process::exit(1);
    }

    if let Err(e) = run(matches) {
        match e {
            AppError::FileReadError(path, e) => error!("[X] Error reading {}: {}", path, e),
            AppError::FileWriteError(path, e) => error!("[X] Error writing {}: {}", path, e),
            AppError::InvalidArgument(e) => error!("[X] Invalid argument: {}", e),
            AppError::RenderFailed(e) => {
                error!("[X] Render error: {}", e);
                error!("    Suggestion: {}", e.suggestion());
            }
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn parses_label_arguments() {
        let (key, value) = parse_label("sectionSkills=Kenntnisse").unwrap();
        assert_eq!(key, LabelKey::Skills);
        assert_eq!(value, "Kenntnisse");
        assert!(matches!(
            parse_label("sectionHobbies=x"),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_label("sectionSkills"),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn explicit_config_wins() {
        let matches = build_command().get_matches_from(vec!["cvforge", "-c", "custom.toml"]);
        match get_config_source(&matches) {
            ConfigSource::File(path) => assert_eq!(path, "custom.toml"),
            other => panic!("Expected File config source, got {:?}", other),
        }
    }

    #[test]
    fn labels_are_collected() {
        let matches = build_command().get_matches_from(vec![
            "cvforge",
            "-l",
            "sectionSkills=Stack",
            "--label",
            "sectionLanguages=Sprachen",
        ]);
        let labels = get_labels(&matches).unwrap();
        assert_eq!(labels.get(LabelKey::Skills), Some("Stack"));
        assert_eq!(labels.get(LabelKey::Languages), Some("Sprachen"));
    }

    #[test]
    fn string_input_is_used_verbatim() {
        let matches = build_command()
            .get_matches_from(vec!["cvforge", "-s", r#"{"personalInfo":{"name":"A"}}"#]);
        let input = get_document_input(&matches).unwrap();
        assert!(input.contains("personalInfo"));
    }

    #[test]
    fn output_dir_defaults_to_current_dir() {
        let matches = build_command().get_matches_from(vec!["cvforge"]);
        let dir = get_output_dir(&matches).unwrap();
        assert_eq!(dir, std::env::current_dir().unwrap());
    }
}

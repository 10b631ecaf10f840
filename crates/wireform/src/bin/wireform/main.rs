mod cli;

use wireform::convert;
use wireform::documents::{ResourceDocuments, ResourceSet};
use wireform::value::Value;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("WIREFORM_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Encode(encode_cli) => encode(encode_cli),
        cli::Command::Decode(decode_cli) => decode(decode_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
    }
}

pub fn encode(cli: cli::EncodeCommand) -> anyhow::Result<()> {
    let documents = load(&cli.input)?;
    let resources = ResourceSet::new(&documents)?;

    let mut out = indexmap::IndexMap::new();
    for resource in resources.resources() {
        let registry = resource.family.registry();
        let wire = convert::to_wire_form(&registry, &resource.config)?;
        out.insert(format!("{}.{}", resource.family, resource.name), wire);
    }

    output(&cli.output, &Value::from(out))?;
    Ok(())
}

pub fn decode(cli: cli::DecodeCommand) -> anyhow::Result<()> {
    let wire_json: serde_json::Value = match &cli.file {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => serde_json::from_str(&std::io::read_to_string(std::io::stdin())?)?,
    };

    let wire = Value::from_json(wire_json);
    let Some(wire) = wire else {
        anyhow::bail!("wire value is null");
    };

    let prior = match &cli.prior {
        Some(path) => {
            // YAML is a superset of the JSON we emit, so one parser covers both
            let parsed: serde_json::Value = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
            Value::from_json(parsed)
        }
        None => None,
    };

    let registry = wireform::registry::Family::from(cli.family).registry();
    let human = convert::to_human_form(&registry, &wire, prior.as_ref())?;

    output(&cli.output, &human)?;
    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<ResourceDocuments> {
    if !input.workdir && input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        let body = hcl_edit::parser::parse_body(&stdin)?;
        return Ok(body.into());
    }

    let mut documents = ResourceDocuments::default();

    if input.workdir {
        documents.load_directory(&std::env::current_dir()?)?;
    }

    for file_path in &input.files {
        documents.load_file(file_path)?;
    }

    for dir_path in &input.directories {
        documents.load_directory(dir_path)?;
    }

    anyhow::ensure!(documents.source_count() > 0, "No files loaded");

    Ok(documents)
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (wireform-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    let mut documents = ResourceDocuments::default();
    documents.load_directory(&std::env::current_dir()?)?;

    let resources = ResourceSet::new(&documents)?;

    match cli.command {
        Documents => println!("{documents:#?}"),
        Resources => println!("{resources:#?}"),
    }

    Ok(())
}

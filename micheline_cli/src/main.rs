use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use micheline_forge::{forge_nodes, pack, unforge_hex, unpack};
use micheline_reflect::{
    to_michelson, InterfaceRegistry, SchemaOptions, Script, TypedAst, ValueForm,
};
use micheline_types::{parse_untyped, untyped_to_json};
use serde_json::Value as JsonValue;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "micheline")]
#[command(about = "Micheline toolkit - binary codec, typed values, diffs and JSON schemas")]
#[command(version)]
struct Cli {
    /// Pretty print JSON output
    #[arg(short = 'p', long = "pretty", global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forge Micheline JSON to hex
    Forge {
        /// Micheline JSON file, `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,
    },

    /// Decode forged hex to Micheline JSON
    Unforge {
        /// File holding hex, `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,
    },

    /// Pack Micheline JSON (0x05 prefix) to hex
    Pack {
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,
    },

    /// Unpack packed hex to Micheline JSON
    Unpack {
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,
    },

    /// Render Micheline JSON as Michelson text
    Format {
        #[arg(value_name = "FILE", default_value = "-")]
        input: PathBuf,
    },

    /// Print the JSON Schema of a type
    Schema {
        /// Micheline JSON of the type
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,
    },

    /// Print the typedef docs of a type, per entrypoint for parameters
    Docs {
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        /// Document each entrypoint separately
        #[arg(long = "entrypoints")]
        entrypoints: bool,
    },

    /// Settle a value and print its Miguel tree
    Miguel {
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        /// Micheline JSON of the value
        #[arg(short = 'v', long = "value", value_name = "FILE")]
        value_file: PathBuf,
    },

    /// Diff two values of the same type
    Diff {
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        #[arg(short = 'v', long = "value", value_name = "FILE")]
        value_file: PathBuf,

        /// Previous value; without it everything is reported as created
        #[arg(long = "previous", value_name = "FILE")]
        previous_file: Option<PathBuf>,
    },

    /// Settle a value and re-emit it in the chosen form
    Normalize {
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: PathBuf,

        #[arg(short = 'v', long = "value", value_name = "FILE")]
        value_file: PathBuf,

        #[arg(short = 'f', long = "form", value_enum, default_value = "readable")]
        form: Form,
    },

    /// Detect token standards and views implemented by a contract
    Interfaces {
        /// Script JSON (section list or RPC script object)
        #[arg(short = 's', long = "script", value_name = "FILE")]
        script: Option<PathBuf>,

        /// Parameter type JSON
        #[arg(short = 't', long = "type", value_name = "FILE")]
        type_file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Form {
    Preserve,
    Optimized,
    Readable,
}

impl From<Form> for ValueForm {
    fn from(form: Form) -> Self {
        match form {
            Form::Preserve => ValueForm::Preserve,
            Form::Optimized => ValueForm::Optimized,
            Form::Readable => ValueForm::Readable,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pretty = cli.pretty;

    match cli.command {
        Commands::Forge { input } => {
            let nodes = parse_untyped(&read_input(&input)?)?;
            println!("{}", hex::encode(forge_nodes(&nodes)?));
        }

        Commands::Unforge { input } => {
            let nodes = unforge_hex(read_input(&input)?.trim())?;
            print_json(&untyped_to_json(&nodes), pretty)?;
        }

        Commands::Pack { input } => {
            let nodes = parse_untyped(&read_input(&input)?)?;
            let packed = match nodes.as_slice() {
                [single] => pack(single)?,
                _ => bail!("pack expects a single Micheline expression, got {}", nodes.len()),
            };
            println!("{}", hex::encode(packed));
        }

        Commands::Unpack { input } => {
            let text = read_input(&input)?;
            let bytes = hex::decode(text.trim().trim_start_matches("0x"))
                .context("packed data is not hex")?;
            print_json(&unpack(&bytes)?.to_json_value(), pretty)?;
        }

        Commands::Format { input } => {
            for node in parse_untyped(&read_input(&input)?)? {
                println!("{}", to_michelson(&node));
            }
        }

        Commands::Schema { type_file } => {
            let ast = load_type(&type_file)?;
            let schema = ast.to_json_schema(&SchemaOptions::default())?;
            print_json(&serde_json::to_value(schema)?, pretty)?;
        }

        Commands::Docs {
            type_file,
            entrypoints,
        } => {
            let ast = load_type(&type_file)?;
            let docs = if entrypoints {
                serde_json::to_value(ast.entrypoint_docs())?
            } else {
                serde_json::to_value(ast.docs())?
            };
            print_json(&docs, pretty)?;
        }

        Commands::Miguel {
            type_file,
            value_file,
        } => {
            let ast = load_settled(&type_file, &value_file)?;
            print_json(&serde_json::to_value(ast.to_miguel()?)?, pretty)?;
        }

        Commands::Diff {
            type_file,
            value_file,
            previous_file,
        } => {
            let current = load_settled(&type_file, &value_file)?;
            let previous = previous_file
                .map(|path| load_settled(&type_file, &path))
                .transpose()?;
            let diff = current.diff(previous.as_ref())?;
            debug!(
                changed = diff.iter().any(|node| node.has_changes()),
                "diff computed"
            );
            print_json(&serde_json::to_value(diff)?, pretty)?;
        }

        Commands::Normalize {
            type_file,
            value_file,
            form,
        } => {
            let ast = load_settled(&type_file, &value_file)?;
            print_json(&ast.to_json(form.into())?, pretty)?;
        }

        Commands::Interfaces { script, type_file } => {
            let parameter = match (script, type_file) {
                (Some(path), None) => {
                    let value: JsonValue = serde_json::from_str(&read_input(&path)?)
                        .with_context(|| format!("parsing {}", path.display()))?;
                    Script::from_value(&value)?.parameter
                }
                (None, Some(path)) => load_type(&path)?,
                _ => bail!("pass exactly one of --script or --type"),
            };
            let tags = InterfaceRegistry::with_defaults().find_interfaces(&parameter)?;
            print_json(&serde_json::to_value(tags)?, pretty)?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_type(path: &Path) -> anyhow::Result<TypedAst> {
    TypedAst::from_type_json(&read_input(path)?)
        .with_context(|| format!("typing {}", path.display()))
}

fn load_settled(type_file: &Path, value_file: &Path) -> anyhow::Result<TypedAst> {
    let mut ast = load_type(type_file)?;
    ast.settle_json(&read_input(value_file)?)
        .with_context(|| format!("settling {}", value_file.display()))?;
    Ok(ast)
}

fn print_json(value: &JsonValue, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

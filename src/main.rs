use std::io::Read;

use flow_layout::{
    auto_layout, new_node_position, Canvas, ConfigError, Edge, LayoutError, NodePlacement,
    Position,
};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USAGE: &str =
    "usage: flow_layout [--canvas CANVAS.json] [--place ID [--from ID[,ID...]]] [FLOW.json]";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Default)]
struct Args {
    canvas: Option<String>,
    flow: Option<String>,
    place: Option<String>,
    from: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FlowFile {
    nodes: Vec<FlowNode>,
    #[serde(default)]
    edges: Vec<Edge<String>>,
}

#[derive(Debug, Deserialize)]
struct FlowNode {
    id: String,
    #[serde(default)]
    position: Position,
    width: Option<i32>,
    height: Option<i32>,
}

#[derive(Debug, Serialize)]
struct Placed<'a> {
    id: &'a str,
    position: Position,
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut iter = argv.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("missing value for {flag}\n{USAGE}")))
        };
        match arg.as_str() {
            "--canvas" => args.canvas = Some(value("--canvas")?),
            "--place" => args.place = Some(value("--place")?),
            "--from" => args.from.extend(
                value("--from")?
                    .split(',')
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            ),
            "-h" | "--help" => return Err(CliError::Usage(USAGE.to_string())),
            other if other.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown option {other}\n{USAGE}")))
            }
            other => {
                if args.flow.replace(other.to_string()).is_some() {
                    return Err(CliError::Usage(format!("more than one flow file\n{USAGE}")));
                }
            }
        }
    }
    if !args.from.is_empty() && args.place.is_none() {
        return Err(CliError::Usage(format!("--from needs --place\n{USAGE}")));
    }
    Ok(args)
}

fn read_input(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let canvas = match &args.canvas {
        Some(path) => Canvas::from_json(&std::fs::read_to_string(path)?)?,
        None => Canvas::default(),
    };
    let flow: FlowFile = serde_json::from_str(&read_input(args.flow.as_deref())?)?;
    info!(
        "loaded flow with {} node(s) and {} edge(s)",
        flow.nodes.len(),
        flow.edges.len()
    );

    let nodes: Vec<NodePlacement<String>> = flow
        .nodes
        .into_iter()
        .map(|node| NodePlacement {
            id: node.id,
            position: node.position,
            width: node.width.unwrap_or(canvas.node_width),
            height: node.height.unwrap_or(canvas.node_height),
        })
        .collect();

    if let Some(id) = &args.place {
        let position = new_node_position(&canvas, &nodes, &args.from);
        info!("placing {id} at {position}");
        println!(
            "{}",
            serde_json::to_string_pretty(&Placed {
                id: id.as_str(),
                position
            })?
        );
        return Ok(());
    }

    let placed = auto_layout(&canvas, &nodes, &flow.edges)?;
    println!("{}", serde_json::to_string_pretty(&placed)?);
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("flow_layout")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_flags_and_flow_file() {
        let args = parse_args(&argv(&[
            "--canvas", "canvas.json", "--place", "n4", "--from", "n1,n2", "flow.json",
        ]))
        .unwrap();
        assert_eq!(args.canvas.as_deref(), Some("canvas.json"));
        assert_eq!(args.place.as_deref(), Some("n4"));
        assert_eq!(args.from, vec!["n1", "n2"]);
        assert_eq!(args.flow.as_deref(), Some("flow.json"));
    }

    #[test]
    fn test_no_arguments_reads_stdin() {
        let args = parse_args(&argv(&[])).unwrap();
        assert!(args.flow.is_none());
        assert!(args.place.is_none());
    }

    #[test]
    fn test_from_without_place_is_usage_error() {
        assert!(matches!(
            parse_args(&argv(&["--from", "a"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_missing_flag_value_is_usage_error() {
        assert!(matches!(
            parse_args(&argv(&["--place"])),
            Err(CliError::Usage(msg)) if msg.starts_with("missing value for --place")
        ));
    }

    #[test]
    fn test_from_skips_empty_ids() {
        let args = parse_args(&argv(&["--place", "c", "--from", "a,,b"])).unwrap();
        assert_eq!(args.from, vec!["a", "b"]);
    }

    #[test]
    fn test_second_flow_file_is_usage_error() {
        assert!(matches!(
            parse_args(&argv(&["one.json", "two.json"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_unknown_option_is_usage_error() {
        assert!(matches!(
            parse_args(&argv(&["--verbose"])),
            Err(CliError::Usage(msg)) if msg.starts_with("unknown option --verbose")
        ));
    }
}

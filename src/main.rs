// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use pico_args::Arguments;


const HELP: &str = "\
pcbsvg merges and recolors SVG layers exported by PCB plotters.

USAGE:
  pcbsvg [OPTIONS] <out-svg> <layer-svg[=COLOR]>...  # to file
  pcbsvg [OPTIONS] -c <layer-svg[=COLOR]>...         # to stdout

  The first layer is used as a base, all other layers are placed on top of it
  in the specified order. A layer can be read from stdin using '-'.
  When COLOR is set, fill and stroke of all layer groups are replaced with it.

OPTIONS:
  -h, --help                    Prints help information
  -V, --version                 Prints version information
  -c                            Prints the output SVG to the stdout

  --invert COLOR                Replaces the image with a solid COLOR
                                rectangle masked by the image
  --invert-opacity NUM          Sets the fill opacity of the inverted image
                                [default: 1] [possible values: 0..1]
  --opacity NUM                 Wraps all layers with a group of the specified
                                opacity [possible values: 0..1]
  --transform TS                Wraps all layers with a group with the specified
                                transform. Example: 'scale(1, -1)'
  --indent INDENT               Sets the XML nodes indent
                                [values: none, 0, 1, 2, 3, 4, tabs] [default: 4]
  --attrs-indent INDENT         Sets the XML attributes indent
                                [values: none, 0, 1, 2, 3, 4, tabs] [default: none]

  --quiet                       Disables warnings
  --verbose                     Prints processing steps

ARGS:
  <out-svg>                     Output file
  <layer-svg>                   Input file
";

#[derive(Debug)]
struct Args {
    invert: Option<String>,
    invert_opacity: f64,
    opacity: Option<f64>,
    transform: Option<String>,
    indent: pcbsvg::Indent,
    attrs_indent: pcbsvg::Indent,

    quiet: bool,
    verbose: bool,

    output: OutputTo,
    layers: Vec<Layer>,
}

#[derive(Clone, PartialEq, Debug)]
struct Layer {
    input: InputFrom,
    color: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom {
    Stdin,
    File(PathBuf),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo {
    Stdout,
    File(PathBuf),
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    let invert = input.opt_value_from_str("--invert")?;
    let invert_opacity = input.opt_value_from_fn("--invert-opacity", parse_opacity)?.unwrap_or(1.0);
    let opacity = input.opt_value_from_fn("--opacity", parse_opacity)?;
    let transform = input.opt_value_from_str("--transform")?;
    let indent = input.opt_value_from_fn("--indent", parse_indent)?
        .unwrap_or(pcbsvg::Indent::Spaces(4));
    let attrs_indent = input.opt_value_from_fn("--attrs-indent", parse_indent)?
        .unwrap_or(pcbsvg::Indent::None);
    let quiet = input.contains("--quiet");
    let verbose = input.contains("--verbose");

    let output = if input.contains("-c") {
        OutputTo::Stdout
    } else {
        OutputTo::File(input.free_from_fn(parse_output)?)
    };

    let mut layers = Vec::new();
    while let Some(layer) = input.opt_free_from_fn(parse_layer)? {
        layers.push(layer);
    }

    if layers.iter().filter(|l| l.input == InputFrom::Stdin).count() > 1 {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: "stdin can be used only by one layer".to_string(),
        });
    }

    Ok(Args {
        invert,
        invert_opacity,
        opacity,
        transform,
        indent,
        attrs_indent,
        quiet,
        verbose,
        output,
        layers,
    })
}

fn parse_opacity(s: &str) -> Result<f64, String> {
    let n: f64 = s.parse().map_err(|_| "invalid number")?;

    if (0.0..=1.0).contains(&n) {
        Ok(n)
    } else {
        Err("opacity out of bounds".to_string())
    }
}

fn parse_indent(s: &str) -> Result<pcbsvg::Indent, String> {
    let indent = match s {
        "none" => pcbsvg::Indent::None,
        "0" => pcbsvg::Indent::Spaces(0),
        "1" => pcbsvg::Indent::Spaces(1),
        "2" => pcbsvg::Indent::Spaces(2),
        "3" => pcbsvg::Indent::Spaces(3),
        "4" => pcbsvg::Indent::Spaces(4),
        "tabs" => pcbsvg::Indent::Tabs,
        _ => return Err("invalid INDENT value".to_string()),
    };

    Ok(indent)
}

fn parse_output(s: &str) -> Result<PathBuf, String> {
    check_not_an_option(s)?;
    Ok(PathBuf::from(s))
}

fn parse_layer(s: &str) -> Result<Layer, String> {
    check_not_an_option(s)?;

    // An existing file wins over the `path=COLOR` form.
    let split = match s.rsplit_once('=') {
        Some(_) if Path::new(s).exists() => None,
        v => v,
    };

    let (path, color) = match split {
        Some((path, color)) => {
            if color.is_empty() {
                return Err(format!("'{}' has an empty color", s));
            }

            (path, Some(color.to_string()))
        }
        None => (s, None),
    };

    let input = match path {
        "" => return Err("layer path cannot be empty".to_string()),
        "-" => InputFrom::Stdin,
        _ => InputFrom::File(PathBuf::from(path)),
    };

    Ok(Layer { input, color })
}

// All known options are already consumed at this point.
fn check_not_an_option(s: &str) -> Result<(), String> {
    if s.starts_with('-') && s != "-" && !s.starts_with("-=") {
        Err(format!("unknown option '{}'", s))
    } else {
        Ok(())
    }
}


fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            let level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
            log::set_max_level(level);
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let mut layers = args.layers.iter();
    let mut doc = match layers.next() {
        Some(layer) => load_layer(layer)?,
        None => return Err("at least one layer must be set".to_string()),
    };

    for layer in layers {
        let other = load_layer(layer)?;
        doc.import_groups(&other).map_err(|e| e.to_string())?;
    }

    if let Some(ref color) = args.invert {
        doc.invert(color, args.invert_opacity).map_err(|e| e.to_string())?;
    }

    let mut wrapper_attrs = Vec::new();
    if let Some(ref ts) = args.transform {
        wrapper_attrs.push(("transform", ts.clone()));
    }

    if let Some(opacity) = args.opacity {
        wrapper_attrs.push(("opacity", opacity.to_string()));
    }

    if !wrapper_attrs.is_empty() {
        let attrs: Vec<_> = wrapper_attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        doc.wrap_with_group(&attrs).map_err(|e| e.to_string())?;
    }

    let opt = pcbsvg::WriteOptions {
        indent: args.indent,
        attributes_indent: args.attrs_indent,
        ..pcbsvg::WriteOptions::default()
    };

    match args.output {
        OutputTo::Stdout => {
            doc.write_to(io::stdout().lock(), &opt)
                .map_err(|_| "failed to write to the stdout".to_string())?;
        }
        OutputTo::File(ref path) => {
            doc.save(path, &opt)
                .map_err(|_| "failed to write to the output file".to_string())?;
        }
    }

    Ok(())
}

fn load_layer(layer: &Layer) -> Result<pcbsvg::Document, String> {
    let mut doc = match layer.input {
        InputFrom::Stdin => {
            let data = load_stdin()?;
            pcbsvg::Document::from_data(&data)
        }
        InputFrom::File(ref path) => {
            log::debug!("Loading '{}'.", path.display());
            pcbsvg::Document::open(path)
        }
    }.map_err(|e| e.to_string())?;

    if let Some(ref color) = layer.color {
        doc.apply_color_transform(pcbsvg::replace_color(color)).map_err(|e| e.to_string())?;
    }

    Ok(doc)
}

fn load_stdin() -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_end(&mut buf)
        .map_err(|_| "failed to read from stdin".to_string())?;

    Ok(buf)
}


/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn  => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info  => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_with_color() {
        let layer = parse_layer("F.Cu.svg=#c83434").unwrap();
        assert_eq!(layer.input, InputFrom::File(PathBuf::from("F.Cu.svg")));
        assert_eq!(layer.color.as_deref(), Some("#c83434"));
    }

    #[test]
    fn layer_from_stdin() {
        let layer = parse_layer("-=red").unwrap();
        assert_eq!(layer.input, InputFrom::Stdin);
        assert_eq!(layer.color.as_deref(), Some("red"));
        assert_eq!(parse_layer("-").unwrap().color, None);
    }

    #[test]
    fn existing_file_with_equal_sign() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out=1.svg");
        std::fs::write(&path, "<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();

        let layer = parse_layer(path.to_str().unwrap()).unwrap();
        assert_eq!(layer.input, InputFrom::File(path.clone()));
        assert_eq!(layer.color, None);

        let arg = format!("{}=blue", path.display());
        let layer = parse_layer(&arg).unwrap();
        assert_eq!(layer.input, InputFrom::File(path));
        assert_eq!(layer.color.as_deref(), Some("blue"));
    }

    #[test]
    fn invalid_layers() {
        assert!(parse_layer("").is_err());
        assert!(parse_layer("=red").is_err());
        assert!(parse_layer("a.svg=").is_err());
        assert!(parse_layer("--foo").is_err());
        assert!(parse_layer("-x").is_err());
        assert!(parse_output("--foo").is_err());
    }

    #[test]
    fn opacity_bounds() {
        assert_eq!(parse_opacity("0.5"), Ok(0.5));
        assert!(parse_opacity("1.5").is_err());
        assert!(parse_opacity("abc").is_err());
    }
}

use dominance::{AnalysisError, ColorAnalyzer, ColorCategory, PaletteEntry, Thresholds};
use std::process::ExitCode;

const USAGE: &str = "usage: dominance <image> <palette key or id> [--thresholds <file.json>] [--ignore r,g,b[,tolerance]]";

struct Args {
    image: String,
    selected: String,
    thresholds: Option<String>,
    ignore: Option<((u8, u8, u8), u8)>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool, AnalysisError> {
    let selected = PaletteEntry::lookup(&args.selected)?;
    let thresholds = match &args.thresholds {
        Some(path) => Thresholds::from_path(path)?,
        None => Thresholds::default(),
    };

    let image = image::open(&args.image)?.to_rgba8();
    log::info!("analysing {} ({}x{})", args.image, image.width(), image.height());

    let mut analyzer = ColorAnalyzer::from_image(image).thresholds(thresholds);
    if let Some((rgb, tolerance)) = args.ignore {
        analyzer = analyzer.ignore_color(rgb, tolerance);
    }

    let report = analyzer.analyze()?;

    for (category, ratio) in report.ratios() {
        if category != ColorCategory::Other || ratio > 0.0 {
            println!("{:>7} {:>6.2}%", category.name(), ratio);
        }
    }

    if let Some((r, g, b)) = report.average_color() {
        println!("average #{r:02X}{g:02X}{b:02X} ({})", report.average_category().map_or("-", ColorCategory::name));
    }

    let verdict = dominance::validate(selected, &report);

    match verdict.detected.category() {
        Some(category) => println!("dominant {category} ({:.2}%)", verdict.dominant_ratio),
        None => println!("dominant: no pixels left to analyse"),
    }

    if verdict.accepted {
        println!(
            "{} {} matches ({:.2}%)",
            selected.emoji(),
            selected.display_name(),
            verdict.selected_ratio
        );
    } else {
        println!(
            "{} {} does not match ({:.2}%)",
            selected.emoji(),
            selected.display_name(),
            verdict.selected_ratio
        );

        if let Some(suggestion) = verdict.suggestion {
            println!("try {} {} ({}) instead", suggestion.emoji(), suggestion.display_name(), suggestion.hex());
        }
    }

    Ok(verdict.accepted)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut thresholds = None;
    let mut ignore = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--thresholds" => thresholds = Some(args.next().ok_or("--thresholds needs a file")?),
            "--ignore" => ignore = Some(parse_ignore(&args.next().ok_or("--ignore needs a color")?)?),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.next()) {
        (Some(image), Some(selected), None) => Ok(Args {
            image,
            selected,
            thresholds,
            ignore,
        }),
        _ => Err("expected an image and a palette entry".to_string()),
    }
}

fn parse_ignore(value: &str) -> Result<((u8, u8, u8), u8), String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bad --ignore value {value:?}: {e}"))?;

    match parts[..] {
        [r, g, b] => Ok(((r, g, b), 0)),
        [r, g, b, tolerance] => Ok(((r, g, b), tolerance)),
        _ => Err(format!("bad --ignore value {value:?}: expected r,g,b or r,g,b,tolerance")),
    }
}

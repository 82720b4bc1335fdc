use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use chj_util::{debug_if, env::get_env_bool, time};
use clap::Parser as ClapParser;
use tablehtml::{config::Config,
                html_table::TableHtmlMaker,
                io_util::my_write,
                specializer::SpecializerRegistry,
                specializers::Base64Specializer,
                table::Table,
                template::{fill_template, make_partial, partial_output_path}};

#[derive(clap::Parser, Debug)]
/// Convert a CSV file to an HTML table. Cells starting with e.g.
/// `@img:URL`, `@color:red`, `@select:a;b=Bravo` get special
/// rendering.
struct Args {
    /// The CSV file to convert
    #[clap(short, long)]
    input: PathBuf,

    /// Where to write the HTML to (default: stdout)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Output only the table with its styling, for inclusion into an
    /// existing HTML page. With --output, "-partial" is appended to
    /// the file name.
    #[clap(short, long)]
    partial: bool,

    /// JSON config file (default: from the TABLEHTML_CONFIG env var
    /// if set)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Pad short rows with this value instead of failing
    #[clap(long)]
    missing_value: Option<String>,

    /// The first row is data, too; columns are named by number
    #[clap(long)]
    no_headers: bool,

    /// Don't show the value of color cells on hover
    #[clap(long)]
    no_tooltips: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let debug = get_env_bool("TABLEHTML_DEBUG")?;

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if args.missing_value.is_some() {
        config.missing_value = args.missing_value.clone();
    }
    if args.no_headers {
        config.with_headers = false;
    }
    if args.no_tooltips {
        config.color_tooltips = false;
    }
    debug_if!(debug, "config: {config:?}");

    let rules = config.attribute_rules()?;
    let table = time!(debug, "reading table";
                      Table::from_csv_file(&args.input,
                                           config.with_headers,
                                           config.missing_value.as_deref()))?;

    let mut registry = SpecializerRegistry::builtin(config.color_tooltips);
    registry.add(Base64Specializer::new());

    let mut maker = TableHtmlMaker::with_registry(&table, registry);
    let content = time!(debug, "rendering"; maker.html(&rules))
        .with_context(|| anyhow!("rendering {:?}", args.input))?;

    let style = config.stylesheet_text()?;
    let (html, output) =
        if args.partial {
            (make_partial(&style, &content),
             args.output.as_deref().map(partial_output_path))
        } else {
            (fill_template(&config.template_text()?, &style, &content),
             args.output.clone())
        };
    if let Some(output) = output {
        debug_if!(debug, "writing {output:?}");
        my_write(&output, &html)?;
    } else {
        let mut out = std::io::stdout().lock();
        out.write_all(html.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
    }
    Ok(())
}

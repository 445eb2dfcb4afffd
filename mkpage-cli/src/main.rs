use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mkpage::error::{Chainable, Result};
use mkpage::resolve::Resolver;
use mkpage::templating::{MiniJinjaEngine, PAGE_TEMPLATE, SLIDES_TEMPLATE};
use mkpage::{extract, page, slides, util};

use crate::config::Templates;

mod config;
mod flags;

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let flags = flags::Mkpage::from_env_or_exit();
    match run(flags.subcommand) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cmd: flags::MkpageCmd) -> Result<()> {
    use flags::MkpageCmd::*;

    match cmd {
        Page(cmd) => make_page(cmd),
        Slides(cmd) => make_slides(cmd),
        Frontmatter(cmd) => {
            let document = read_input(cmd.file.as_deref())?;
            println!("{}", extract::front_matter(&document, cmd.json)?);
            Ok(())
        }
        Codesnip(cmd) => {
            let document = read_input(cmd.file.as_deref())?;
            print!("{}", extract::codesnip(&document, &cmd.language));
            Ok(())
        }
        Byline(cmd) => {
            let document = read_input(cmd.file.as_deref())?;
            let found = match (&cmd.expression, cmd.title) {
                (Some(expression), _) => {
                    let regex = regex::Regex::new(expression)?;
                    extract::grep(&regex, &document).map(String::from)
                }
                (None, true) => extract::title(&document).map(String::from),
                (None, false) => extract::byline(&document).map(String::from),
            };

            if let Some(found) = found {
                println!("{found}");
            }

            Ok(())
        }
        Reldocpath(cmd) => {
            println!("{}", util::relative_doc_path(&cmd.source, &cmd.target));
            Ok(())
        }
        ShowTemplate(cmd) => {
            let template = match cmd.name.as_deref() {
                None | Some("page.tmpl" | "page") => PAGE_TEMPLATE,
                Some("slides.tmpl" | "slides") => SLIDES_TEMPLATE,
                Some(name) => return mkpage::err! {
                    Template: "no such built-in template",
                    "name" => name,
                    "available" => "page.tmpl, slides.tmpl",
                },
            };

            print!("{template}");
            Ok(())
        }
    }
}

fn make_page(cmd: flags::Page) -> Result<()> {
    let kv = config::key_values(&cmd.pairs)?;
    let templates = Templates::discover(&cmd.template)?;
    let engine = MiniJinjaEngine::new(&templates.set)?;
    let data = Resolver::new(&config::resolver_config(cmd.timeout))?.resolve_all(&kv)?;

    match &cmd.output {
        Some(path) => {
            let file = fs::File::create(path).chain_with(|| mkpage::error! {
                Io: "failed to create output file",
                "file path" => path.display(),
            })?;

            page::make_page(io::BufWriter::new(file), &engine, None, &data)?;
            log::info!("wrote {}", path.display());
        }
        None => page::make_page(io::stdout().lock(), &engine, None, &data)?,
    }

    Ok(())
}

fn make_slides(cmd: flags::Slides) -> Result<()> {
    let kv = config::key_values(&cmd.pairs)?;
    let templates = Templates::discover(&cmd.template)?;
    let engine = MiniJinjaEngine::new(&templates.set)?;
    let name = templates.builtin.then_some("slides.tmpl");

    let document = read_input(Some(cmd.markdown.as_path()))?;
    let filename = cmd.markdown.display().to_string();
    let deck = slides::split_to_slides(&filename, &document)?;
    let data = Resolver::new(&config::resolver_config(cmd.timeout))?.resolve_all(&kv)?;

    let directory = cmd.directory.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&directory).chain_with(|| mkpage::error! {
        Io: "failed to create slide directory",
        "directory" => directory.display(),
    })?;

    for slide in &deck {
        slides::make_slide_file(&directory, &engine, name, &data, slide)?;
    }

    if cmd.toc {
        slides::make_toc_file(&directory, &engine, name, &data, &deck)?;
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).chain_with(|| mkpage::error! {
            Io: "failed to read input",
            "file path" => path.display(),
        }),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

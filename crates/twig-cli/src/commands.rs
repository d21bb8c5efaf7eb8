use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use twig_history::RenderOptions;
use twig_repo::Repository;
use twig_store::{Object, ObjectKind, ObjectStore, StoredObject};
use twig_types::ObjectId;

use crate::cli::*;

pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let base = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot read the current directory")?,
    };
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(&base, args, format, out),
        Command::HashObject(args) => cmd_hash_object(&base, args, format, out),
        Command::CatFile(args) => cmd_cat_file(&base, args, format, out),
        Command::Log(args) => cmd_log(&base, args, format, out),
        Command::MergeBase(args) => cmd_merge_base(&base, args, format, out),
        Command::UpdateRef(args) => cmd_update_ref(&base, args, format, out),
        Command::Show(args) => cmd_show(&base, args, format, out),
    }
}

fn cmd_init(base: &Path, args: InitArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let path = match args.path {
        Some(p) if p.is_absolute() => p,
        Some(p) => base.join(p),
        None => base.to_path_buf(),
    };
    let repo = Repository::init(&path)
        .with_context(|| format!("cannot initialize repository in {}", path.display()))?;
    match format {
        OutputFormat::Text => writeln!(
            out,
            "{} Initialized twig repository in {}",
            "✓".green().bold(),
            repo.git_dir().display().to_string().bold()
        )?,
        OutputFormat::Json => writeln!(out, "{}", json!({ "git_dir": repo.git_dir() }))?,
    }
    Ok(())
}

fn cmd_hash_object(base: &Path, args: HashObjectArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let kind: ObjectKind = args.kind.parse()?;
    let file = resolve_path(base, &args.file);
    let data = std::fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;
    // Reject payloads that would not read back, but hash the bytes as given.
    Object::deserialize(kind, &data)?;
    let object = StoredObject::new(kind, data);

    let id = if args.write {
        let repo = Repository::discover(base)?;
        repo.objects().hash_object(&object, true)?
    } else {
        object.compute_id()
    };
    print_id(out, id, format)
}

fn cmd_cat_file(base: &Path, args: CatFileArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let kind: ObjectKind = args.kind.parse()?;
    let repo = Repository::discover(base)?;
    let id = repo.resolve(&args.object)?;
    let stored = repo.objects().require(&id)?;
    if stored.kind != kind {
        bail!("object {} is a {}, not a {}", id, stored.kind, kind);
    }

    match format {
        OutputFormat::Text => out.write_all(&stored.data)?,
        OutputFormat::Json => {
            let value = match Object::from_stored_object(&stored)? {
                Object::Commit(commit) => json!({ "id": id, "kind": kind.tag(), "commit": commit }),
                Object::Blob(blob) => json!({
                    "id": id,
                    "kind": kind.tag(),
                    "size": blob.data.len(),
                    "content": String::from_utf8_lossy(&blob.data),
                }),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }
    Ok(())
}

fn cmd_log(base: &Path, args: LogArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = Repository::discover(base)?;
    let head = repo.resolve(&args.rev)?;
    let history = repo.history();

    let mut ids = history.log(head)?;
    if let Some(limit) = args.limit {
        ids.truncate(limit);
    }

    match format {
        OutputFormat::Text => {
            let options = RenderOptions { color: !args.no_color };
            let text = history.render_log(&ids, options)?;
            if !text.is_empty() {
                writeln!(out, "{text}")?;
            }
        }
        OutputFormat::Json => {
            let entries = history.entries(&ids)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        }
    }
    Ok(())
}

fn cmd_merge_base(base: &Path, args: MergeBaseArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = Repository::discover(base)?;
    let ids = args
        .revs
        .iter()
        .map(|rev| repo.resolve(rev))
        .collect::<Result<Vec<_>, _>>()?;
    let merge_base = repo.history().merge_base(&ids)?;
    print_id(out, merge_base, format)
}

fn cmd_update_ref(base: &Path, args: UpdateRefArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = Repository::discover(base)?;
    let id = repo.resolve(&args.rev)?;
    repo.update_ref(&args.name, id)?;
    if format == OutputFormat::Json {
        writeln!(out, "{}", json!({ "ref": args.name, "id": id }))?;
    }
    Ok(())
}

fn cmd_show(base: &Path, args: ShowArgs, format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let repo = Repository::discover(base)?;
    let id = repo.resolve(&args.rev)?;
    let history = repo.history();
    let entry = history.entry(&id)?;
    let commit = repo.objects().read_commit(&id)?;

    match format {
        OutputFormat::Text => {
            let options = RenderOptions { color: !args.no_color };
            writeln!(out, "{}", entry.render(options).trim_end())?;
            if let Some(body) = commit.long_msg() {
                writeln!(out)?;
                for line in body.trim_end().lines() {
                    writeln!(out, "    {line}")?;
                }
            }
        }
        OutputFormat::Json => {
            let value = json!({ "entry": entry, "commit": commit });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
    }
    Ok(())
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn print_id(out: &mut dyn Write, id: ObjectId, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{id}")?,
        OutputFormat::Json => writeln!(out, "{}", json!({ "id": id }))?,
    }
    Ok(())
}

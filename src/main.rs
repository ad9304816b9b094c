use std::path::{Path, PathBuf};

use regcompare::{
    check_deps, extract_text, install_help_for, load_config, needs_pdftotext, now_ms, run_pipeline, validate_source,
    AuditEntry, CompareConfig, ComparisonReport, ComparisonStore, ExtractError, Meta, PipelineOutput, SourceError,
    StoreError, DEFAULT_CONFIG_FILE,
};
use serde_json::json;

const EXIT_SOURCE: i32 = 1;
const EXIT_DEPS: i32 = 2;
const EXIT_CONFIG: i32 = 3;
const EXIT_DUPLICATE: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;
const EXIT_STORE: i32 = 6;
const EXIT_USAGE: i32 = 64;

const USAGE: &str = r#"Usage:
  regcompare compare --title <TITLE> <OLD> <NEW>   compare and store
  regcompare diff <OLD> <NEW>                      compare, print only
  regcompare show <UUID>
  regcompare delete <UUID>
  regcompare list
Options:
  --config <PATH>   config file (default ./regcompare.yaml)
  --store <DIR>     comparison store directory
  --no-layout       run pdftotext without -layout
Sources are .pdf files (extracted with pdftotext) or .txt files holding extracted text."#;

struct Cli {
    command: String,
    positional: Vec<String>,
    title: Option<String>,
    config: Option<PathBuf>,
    store: Option<PathBuf>,
    no_layout: bool,
}

fn log(event: serde_json::Value) {
    eprintln!("{}", event);
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut positional = Vec::new();
    let mut title = None;
    let mut config = None;
    let mut store = None;
    let mut no_layout = false;
    let mut i = 0;
    while i < args.len() {
        let a = args[i].as_str();
        match a {
            "--title" | "--config" | "--store" => {
                let val = args.get(i + 1).filter(|v| !v.starts_with("--")).ok_or_else(|| format!("{} needs a value", a))?;
                match a {
                    "--title" => title = Some(val.clone()),
                    "--config" => config = Some(PathBuf::from(val)),
                    _ => store = Some(PathBuf::from(val)),
                }
                i += 2;
                continue;
            }
            "--no-layout" => no_layout = true,
            _ if a.starts_with("--") => return Err(format!("unknown flag {}", a)),
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }
    if positional.is_empty() {
        return Err("missing command".into());
    }
    let command = positional.remove(0);
    Ok(Cli { command, positional, title, config, store, no_layout })
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(c) => c,
        Err(msg) => {
            log(json!({"tool":"parse_args","error": msg,"error_code": EXIT_USAGE}));
            eprintln!("{}", USAGE);
            std::process::exit(EXIT_USAGE);
        }
    };

    let (config_path, explicit) = match &cli.config {
        Some(p) => (p.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut cfg = match load_config(&config_path, explicit) {
        Ok(c) => c,
        Err(e) => {
            log(json!({"tool":"load_config","file": config_path,"error": e.to_string(),"error_code": EXIT_CONFIG}));
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(dir) = &cli.store {
        cfg.store.dir = dir.display().to_string();
    }
    if cli.no_layout {
        cfg.extraction.layout = false;
    }
    log(json!({
        "tool":"load_config",
        "status":"ok",
        "file": config_path,
        "store_dir": cfg.store.dir,
        "layout": cfg.extraction.layout
    }));

    let code = match (cli.command.as_str(), cli.positional.as_slice()) {
        ("compare", [old, new]) => match &cli.title {
            Some(title) if !title.trim().is_empty() => cmd_compare(&cfg, title, old, new),
            _ => usage_error("compare requires --title"),
        },
        ("diff", [old, new]) => cmd_diff(&cfg, old, new),
        ("show", [uuid]) => cmd_show(&cfg, uuid),
        ("delete", [uuid]) => cmd_delete(&cfg, uuid),
        ("list", []) => cmd_list(&cfg),
        (other, _) => usage_error(&format!("bad arguments for command '{}'", other)),
    };
    std::process::exit(code);
}

fn usage_error(msg: &str) -> i32 {
    log(json!({"tool":"parse_args","error": msg,"error_code": EXIT_USAGE}));
    eprintln!("{}", USAGE);
    EXIT_USAGE
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(_) => println!("{}", value),
    }
}

/// Validate, extract, and compare both sources. Err carries the exit code, already logged.
fn extract_and_compare(cfg: &CompareConfig, old: &str, new: &str) -> Result<PipelineOutput, i32> {
    for src in [old, new] {
        if let Err(e) = validate_source(Path::new(src), &cfg.sources.allowed_extensions) {
            let label = match e {
                SourceError::NotFound(_) => "NotFound",
                SourceError::UnsupportedType { .. } => "UnsupportedType",
            };
            log(json!({"tool":"validate_source","file": src,"error": label,"detail": e.to_string(),"error_code": EXIT_SOURCE}));
            return Err(EXIT_SOURCE);
        }
    }

    if needs_pdftotext(Path::new(old)) || needs_pdftotext(Path::new(new)) {
        let deps = check_deps();
        if !deps.ok {
            log(json!({"tool":"check_deps","missing": deps.missing,"error_code": EXIT_DEPS}));
            let help = install_help_for(&deps.missing);
            if !help.is_empty() {
                eprintln!("{}", help);
            }
            return Err(EXIT_DEPS);
        }
        log(json!({"tool":"check_deps","status":"ok"}));
    }

    let mut texts = Vec::with_capacity(2);
    for src in [old, new] {
        match extract_text(Path::new(src), cfg.extraction.layout) {
            Ok(text) => {
                log(json!({"tool":"extract_text","file": src,"length": text.len()}));
                texts.push(text);
            }
            Err(err) => {
                let label = match err {
                    ExtractError::FileNotFound(_) => "FileNotFound",
                    ExtractError::EncryptedPdf(_) => "EncryptedPDF",
                    ExtractError::ToolMissing => "ToolMissing",
                    ExtractError::Failed(_) => "ExtractFailed",
                };
                log(json!({"tool":"extract_text","file": src,"error": label,"detail": err.to_string(),"error_code": EXIT_SOURCE}));
                return Err(EXIT_SOURCE);
            }
        }
    }

    let out = run_pipeline(&texts[0], &texts[1]);
    for (side, stats) in [("old", &out.old), ("new", &out.new)] {
        log(json!({"tool":"normalize","side": side,"stats": stats.clean}));
        log(json!({"tool":"segment","side": side,"clauses": stats.clauses}));
    }
    log(json!({"tool":"diff","status":"ok","summary": out.comparison.summary}));
    Ok(out)
}

fn open_store(cfg: &CompareConfig) -> Result<ComparisonStore, i32> {
    ComparisonStore::open(&cfg.store_dir()).map_err(|e| {
        log(json!({"tool":"store","dir": cfg.store.dir,"error": e.to_string(),"error_code": EXIT_STORE}));
        EXIT_STORE
    })
}

fn cmd_diff(cfg: &CompareConfig, old: &str, new: &str) -> i32 {
    let out = match extract_and_compare(cfg, old, new) {
        Ok(o) => o,
        Err(code) => return code,
    };
    print_json(&json!({
        "meta": Meta::from_sources(old, new),
        "summary": out.comparison.summary,
        "changes": out.comparison.changes,
    }));
    0
}

fn cmd_compare(cfg: &CompareConfig, title: &str, old: &str, new: &str) -> i32 {
    let store = match open_store(cfg) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let audit = store.audit_log();
    let request = json!({"title": title, "old_source": old, "new_source": new});
    let record_audit = |response: &serde_json::Value, status: i32| {
        let entry = AuditEntry {
            command: "compare".into(),
            request: request.clone(),
            response: response.clone(),
            status,
            at_ms: now_ms(),
        };
        if let Err(e) = audit.append(&entry) {
            log(json!({"tool":"audit","file": audit.path(),"error": e.to_string()}));
        }
    };
    let duplicate = |uuid: &str, title: &str| -> i32 {
        let response = json!({
            "message": "Comparison for these sources already exists",
            "data": {"uuid": uuid, "title": title}
        });
        log(json!({"tool":"store","error":"Duplicate","uuid": uuid,"error_code": EXIT_DUPLICATE}));
        print_json(&response);
        record_audit(&response, EXIT_DUPLICATE);
        EXIT_DUPLICATE
    };

    // cheap early exit; create() re-checks atomically
    if let Ok(Some((uuid, existing_title))) = store.find_pair(old, new) {
        return duplicate(&uuid, &existing_title);
    }

    let out = match extract_and_compare(cfg, old, new) {
        Ok(o) => o,
        Err(code) => {
            record_audit(&json!({"message": "Error processing comparison"}), code);
            return code;
        }
    };

    let report = ComparisonReport::new(title, old, new, out.comparison);
    match store.create(&report) {
        Ok(path) => {
            log(json!({"tool":"store","status":"ok","uuid": report.uuid,"path": path}));
            let response = json!({"message": "Comparison created successfully", "data": report});
            print_json(&response);
            record_audit(&response, 0);
            0
        }
        Err(StoreError::Duplicate { uuid, title }) => duplicate(&uuid, &title),
        Err(e) => {
            log(json!({"tool":"store","error": e.to_string(),"error_code": EXIT_STORE}));
            let response = json!({"message": "Error processing comparison", "error": e.to_string()});
            record_audit(&response, EXIT_STORE);
            EXIT_STORE
        }
    }
}

fn store_error_code(tool: &str, uuid: &str, e: &StoreError) -> i32 {
    let code = match e {
        StoreError::NotFound(_) => EXIT_NOT_FOUND,
        _ => EXIT_STORE,
    };
    log(json!({"tool": tool,"uuid": uuid,"error": e.to_string(),"error_code": code}));
    if code == EXIT_NOT_FOUND {
        print_json(&json!({"message": "Data not found"}));
    }
    code
}

fn cmd_show(cfg: &CompareConfig, uuid: &str) -> i32 {
    let store = match open_store(cfg) {
        Ok(s) => s,
        Err(code) => return code,
    };
    match store.get(uuid) {
        Ok(report) => {
            print_json(&json!({
                "uuid": report.uuid,
                "title": report.title,
                "meta": report.meta,
                "summary": report.summary,
                "changes": report.changes,
            }));
            0
        }
        Err(e) => store_error_code("show", uuid, &e),
    }
}

fn cmd_delete(cfg: &CompareConfig, uuid: &str) -> i32 {
    let store = match open_store(cfg) {
        Ok(s) => s,
        Err(code) => return code,
    };
    match store.delete(uuid) {
        Ok(_) => {
            print_json(&json!({"message": "Comparison deleted successfully", "uuid": uuid}));
            0
        }
        Err(e) => store_error_code("delete", uuid, &e),
    }
}

fn cmd_list(cfg: &CompareConfig) -> i32 {
    let store = match open_store(cfg) {
        Ok(s) => s,
        Err(code) => return code,
    };
    match store.list() {
        Ok(reports) => {
            let rows: Vec<serde_json::Value> = reports
                .iter()
                .map(|r| json!({"uuid": r.uuid, "title": r.title, "meta": r.meta, "summary": r.summary}))
                .collect();
            print_json(&json!(rows));
            0
        }
        Err(e) => store_error_code("list", "", &e),
    }
}

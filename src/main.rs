// ==========================================
// 施工进度计划系统 - 命令行入口
// ==========================================
// 用法: work-schedule [--db PATH] [--seed] <command> [json-args]
// 结果 JSON 写到 stdout, 日志写到 stderr; 失败时退出码为 1
// ==========================================

use std::process::ExitCode;

use serde_json::{json, Value};
use work_schedule::app::{command_names, dispatch, get_default_db_path, AppState};

/// 命令行参数
#[derive(Debug, Default)]
struct CliArgs {
    db_path: Option<String>,
    seed: bool,
    help: bool,
    command: Option<String>,
    raw_args: Option<String>,
}

fn parse_cli(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let path = args.next().ok_or("--db 需要数据库路径")?;
                cli.db_path = Some(path);
            }
            "--seed" => cli.seed = true,
            "-h" | "--help" => cli.help = true,
            _ if cli.command.is_none() => cli.command = Some(arg),
            _ if cli.raw_args.is_none() => cli.raw_args = Some(arg),
            _ => return Err(format!("多余的参数: {}", arg)),
        }
    }

    Ok(cli)
}

fn print_usage() {
    eprintln!("用法: work-schedule [--db PATH] [--seed] <command> [json-args]");
    eprintln!();
    eprintln!("命令:");
    for name in command_names() {
        eprintln!("  {}", name);
    }
}

fn main() -> ExitCode {
    work_schedule::logging::init();

    let cli = match parse_cli(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if cli.help || (cli.command.is_none() && !cli.seed) {
        print_usage();
        return if cli.help {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let db_path = cli.db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{}", work_schedule::APP_NAME, work_schedule::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("无法初始化AppState: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.seed {
        let demo = json!({ "district": "Demo district", "street": "Demo street 1" });
        match dispatch(&state, "create_object", demo) {
            Ok(out) => println!("{}", out),
            Err(err) => {
                println!("{}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(command) = cli.command else {
        return ExitCode::SUCCESS;
    };

    let args = match cli.raw_args.as_deref().map(|raw| serde_json::from_str::<Value>(raw)) {
        None => Value::Null,
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            eprintln!("参数不是合法的 JSON: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&state, &command, args) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use monitoring_dispatcher::command::{
    AcknowledgeCommand, AddCommentCommand, Comment, Command, CommandError, MonitoredObject, RestartProcessCommand,
    ScheduleCheckCommand, Target,
};
use monitoring_dispatcher::config::DispatcherConfig;
use monitoring_dispatcher::dispatch::{dispatch, notify, NotificationSink};
use monitoring_dispatcher::filter::registry::monitoring_filter;
use monitoring_dispatcher::filter::Filter;
use monitoring_dispatcher::logging;
use monitoring_dispatcher::sql_compiler::SqlCompiler;
use monitoring_dispatcher::transport::{CommandTransport, TransportChain};
use monitoring_dispatcher::url_filter;

/// 交互式监控Filter与外部命令控制台
#[derive(Parser, Debug)]
#[command(name = "monitoring-dispatcher", version)]
struct Args {
    /// 包含传输通道和列映射的JSON配置文件
    #[arg(short, long, default_value = "dispatcher.json")]
    config: PathBuf,

    /// SQL查询的目标表
    #[arg(long, default_value = "objects")]
    table: String,

    /// 通过配置的传输通道发送命令, 而不只是打印
    #[arg(long)]
    send: bool,

    /// 更详细的日志输出 (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Console {
    filter: Filter,
    compiler: SqlCompiler,
    table: String,
    config: DispatcherConfig,
    transport: Option<TransportChain>,
}

struct Stdout;

impl NotificationSink for Stdout {
    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn error(&self, message: &str) {
        println!("✗ {}", message);
    }
}

fn load_config(path: &Path) -> DispatcherConfig {
    match DispatcherConfig::from_json_file(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "using the default configuration");
            DispatcherConfig::default()
        }
    }
}

/// `web1;http,web2` 解析为一个服务和一个主机
fn parse_objects(spec: &str) -> Vec<MonitoredObject> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|object| match object.split_once(';') {
            Some((host, service)) => MonitoredObject::service(host, service),
            None => MonitoredObject::host(object),
        })
        .collect()
}

/// `<objects> <author> <text...>`
fn split_comment(rest: &str) -> Result<(Vec<MonitoredObject>, Comment)> {
    let mut parts = rest.splitn(3, ' ');
    let (Some(objects), Some(author), Some(text)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected <host[;service],...> <author> <comment>");
    };
    Ok((parse_objects(objects), Comment::new(author, text.trim())))
}

/// 批量试运行: 每个对象单独给出结果
fn render_each<C, F>(objects: &[MonitoredObject], mut build: F) -> Vec<(Target, Result<String, CommandError>)>
where
    C: Command,
    F: FnMut(&MonitoredObject) -> Result<C, CommandError>,
{
    objects
        .iter()
        .map(|object| {
            let target = object.target();
            let line = build(object).and_then(|command| command.render(&target));
            (target, line)
        })
        .collect()
}

impl Console {
    fn show_filter(&self, query: &str) {
        let parsed = self.filter.create_query_tree_for_filter(query);
        println!("tree:    {}", parsed.tree());
        if !parsed.ignored_query_parts().is_empty() {
            println!("ignored: {:?}", parsed.ignored_query_parts());
        }
        if parsed.tree().is_empty() {
            return;
        }
        println!("url:     {}", url_filter::to_url(parsed.tree()));
        match self.compiler.compile(parsed.tree(), &self.table) {
            Ok(result) => {
                println!("sql:     {}", result.sql);
                for optimization in &result.optimizations {
                    println!("         • {:?}", optimization);
                }
            }
            Err(e) => println!("sql:     ✗ {}", e),
        }
    }

    fn show_proposals(&self, partial: &str) {
        for proposal in self.filter.proposals_for_query(partial) {
            println!("  {}", proposal);
        }
    }

    fn run_command<C, F>(&self, objects: &[MonitoredObject], noun: &str, build: F) -> Result<()>
    where
        C: Command,
        F: FnMut(&MonitoredObject) -> Result<C, CommandError>,
    {
        match &self.transport {
            Some(transport) => {
                let report = dispatch(transport, objects, build);
                for failure in &report.failures {
                    Stdout.error(&format!("{}: {}", failure.object.target(), failure.error));
                }
                notify(&report, &Stdout, noun);
            }
            None => {
                for (target, line) in render_each(objects, build) {
                    match line {
                        Ok(line) => println!("{}", line),
                        Err(e) => Stdout.error(&format!("{}: {}", target, e)),
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_command(&self, line: &str) -> Result<()> {
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        match name {
            ":ack" => {
                let (objects, comment) = split_comment(rest)?;
                self.run_command(&objects, "acknowledgement", |_| {
                    Ok(AcknowledgeCommand::new(comment.clone()))
                })
            }
            ":comment" => {
                let (objects, comment) = split_comment(rest)?;
                self.run_command(&objects, "comment", |_| Ok(AddCommentCommand::new(comment.clone())))
            }
            ":check" => {
                let objects = parse_objects(rest);
                let now = chrono::Utc::now().timestamp();
                self.run_command(&objects, "check", |_| ScheduleCheckCommand::new(now))
            }
            ":restart" => match &self.transport {
                Some(transport) => {
                    transport
                        .send(&RestartProcessCommand, &Target::global(), None)
                        .context("restart failed")?;
                    Stdout.success("Sent 1 restart");
                    Ok(())
                }
                None => {
                    println!("{}", RestartProcessCommand.render(&Target::global())?);
                    Ok(())
                }
            },
            ":probe" => {
                let built;
                let chain = match &self.transport {
                    Some(chain) => chain,
                    None => {
                        built = self.config.build_transport().context("invalid transport configuration")?;
                        &built
                    }
                };
                if chain.is_empty() {
                    bail!("no transports configured");
                }
                for (name, result) in chain.probe_each() {
                    match result {
                        Ok(()) => Stdout.success(name),
                        Err(e) => Stdout.error(&format!("{}: {}", name, e)),
                    }
                }
                Ok(())
            }
            ":url" => {
                let tree = url_filter::parse_url(rest.trim());
                println!("tree:    {}", tree);
                Ok(())
            }
            _ => bail!("unknown command {}", name),
        }
    }
}

fn print_help() {
    println!("<filter>                         parse a filter, e.g. Host Is Down AND Service Is Critical");
    println!("?<partial filter>                propose completions");
    println!(":url <query string>              parse the URL form of a filter");
    println!(":ack <objects> <author> <text>   acknowledge, objects as host[;service],...");
    println!(":comment <objects> <author> <text>");
    println!(":check <objects>                 schedule a check now");
    println!(":restart                         restart the monitoring process");
    println!(":probe                           check that the configured transports can be reached");
    println!(":quit");
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = load_config(&args.config);
    let mut compiler = SqlCompiler::new();
    compiler.set_column_mapping(config.column_mapping().clone());
    let transport = if args.send {
        Some(config.build_transport().context("invalid transport configuration")?)
    } else {
        None
    };
    let console = Console {
        filter: monitoring_filter(),
        compiler,
        table: args.table,
        config,
        transport,
    };

    println!("--- monitoring-dispatcher: filters and external commands (:help) ---");
    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        if line == ":quit" || line == ":q" {
            break;
        } else if line == ":help" {
            print_help();
        } else if let Some(partial) = line.strip_prefix('?') {
            console.show_proposals(partial);
        } else if line.starts_with(':') {
            if let Err(e) = console.handle_command(line) {
                println!("✗ {:#}", e);
            }
        } else {
            console.show_filter(line);
        }
    }
    Ok(())
}

use anyhow::Result;
use hw_formatter::utils::logging;
use hw_formatter::{App, Config};
use std::path::Path;

const USAGE: &str = "用法: hw_formatter <输入目录> <输出目录>";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [input, output] = args.as_slice() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    // 加载配置
    let config = Config::discover()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::new(config)?;

    // Ctrl-C 直接终止整个批处理，不被单个学生的错误处理吞掉
    tokio::select! {
        result = app.run(Path::new(input), Path::new(output)) => {
            let stats = result?;
            if stats.failed > 0 {
                anyhow::bail!("{} 个学生处理失败", stats.failed);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            // 运行时退出时会等待仍在执行的合并任务，这里直接结束进程
            tracing::error!("收到中断信号，已停止处理");
            std::process::exit(130);
        }
    }

    Ok(())
}

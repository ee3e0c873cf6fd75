//! 加载 HipMRI 数据集的一个划分, 输出统计概览, 并按需导出预览图.
//!
//! 用法: `slice-report [train|test|validate]`, 默认 `test`.

mod report;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .expect("Logger initialization error");

    let partition = std::env::args().nth(1).unwrap_or_else(|| "test".to_owned());
    match runner::run(&partition) {
        Ok(report) => report.analyze(),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

pub mod attractions;
pub mod cli;
pub mod collectors;
pub mod commands;
pub mod config;
pub mod coords;
pub mod database;
pub mod error;
pub mod fallback;
pub mod routing;
pub mod session;
pub mod visit_list;

use clap::Parser;

pub use error::{Result, TripError};

pub fn run() {
    env_logger::init();

    let cli = cli::Cli::parse();

    // 单线程事件循环，网络请求依次等待
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("初始化运行时失败: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(cli::execute(cli)) {
        eprintln!("오류: {}", e);
        std::process::exit(1);
    }
}

//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：启动日志、连接浏览器、加载设置、组装引擎
//! 2. **指令通道**：控制台指令经指令中继送达引擎
//! 3. **状态输出**：订阅回复计数通知并写入日志
//! 4. **资源管理**：持有 Browser，退出前停止引擎并等待进行中的回复

use std::sync::Arc;

use anyhow::Result;
use chromiumoxide::Browser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{ChromeFeedPage, FeedPage, JsExecutor};
use crate::models::OperatorCommand;
use crate::orchestrator::engine::Engine;
use crate::orchestrator::relay::SUPPORTED_HOSTS;
use crate::services::{LlmService, OpenAiBackend, SettingsStore, StatusReporter};
use crate::utils::logging;
use crate::workflow::DraftOutcome;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    engine: Engine,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init(Some(&config.output_log_file), config.verbose_logging)?;
        logging::log_startup(config.browser_debug_port, &config.settings_path);

        // 连接浏览器
        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            &config.target_url,
            SUPPORTED_HOSTS,
        )
        .await?;

        let page: Arc<dyn FeedPage> = Arc::new(ChromeFeedPage::new(JsExecutor::new(page)));
        let settings = Arc::new(SettingsStore::open(&config.settings_path)?);
        let http = reqwest::Client::builder()
            .timeout(config.timing.generation_timeout)
            .build()?;
        let generator = Arc::new(LlmService::new(
            OpenAiBackend::with_client(http),
            config.timing.generation_timeout,
        ));

        let engine = Engine::assemble(
            page,
            generator,
            settings,
            StatusReporter::default(),
            config.timing.clone(),
        );
        engine.relay.handshake();

        Ok(Self {
            config,
            _browser: browser,
            engine,
        })
    }

    /// 运行应用主逻辑，直到操作员退出或输入结束
    pub async fn run(&self) -> Result<()> {
        self.spawn_count_logger();

        match self.engine.relay.resume_persisted().await {
            Ok(true) => info!("✓ 已恢复自动回复"),
            Ok(false) => {}
            Err(e) => warn!("⚠️ 恢复运行状态失败: {}", e),
        }

        logging::log_console_help();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(command) = OperatorCommand::parse(&line) else {
                if !line.trim().is_empty() {
                    logging::log_console_help();
                }
                continue;
            };
            if command == OperatorCommand::Quit {
                break;
            }
            self.handle(command).await;
        }

        info!("⏳ 正在退出，等待进行中的回复结束...");
        self.engine.shutdown().await;
        info!("日志已保存至: {}", self.config.output_log_file);
        Ok(())
    }

    async fn handle(&self, command: OperatorCommand) {
        match command {
            OperatorCommand::Start | OperatorCommand::Stop => {
                let running = command == OperatorCommand::Start;
                let relay = &self.engine.relay;
                let result = match relay.command_from_settings(running) {
                    Ok(cmd) => relay.dispatch(cmd).await.map_err(anyhow::Error::from),
                    Err(e) => Err(e.into()),
                };
                if let Err(e) = result {
                    error!("❌ 指令未送达: {}", e);
                }
            }
            OperatorCommand::Status => self.log_status(),
            OperatorCommand::Draft(id) => match self.engine.draft(&id).await {
                Ok(Some(DraftOutcome::Injected(reply))) => {
                    info!("✓ 草稿已填入输入框: {}", reply)
                }
                Ok(Some(DraftOutcome::Returned(reply))) => info!("📋 草稿: {}", reply),
                Ok(None) => warn!("⚠️ 页面上没有找到帖子 #{}", id),
                Err(e) => error!("❌ 草稿生成失败: {}", e),
            },
            OperatorCommand::Quit => {}
        }
    }

    fn log_status(&self) {
        let session = &self.engine.session;
        info!("{}", "─".repeat(60));
        info!("📊 状态: {:?}", session.state());
        info!("📥 队列: {} 条  👁 已见: {} 条", session.queue_len(), session.seen_count());
        info!("✅ 累计回复: {}", self.engine.counter.current());
        debug!("待回复: {:?}", session.queued_ids());
        info!("{}", "─".repeat(60));
    }

    fn spawn_count_logger(&self) {
        let mut updates = self.engine.reporter.subscribe();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => info!("🔢 回复计数: {}", update.count),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

//! Podcastbot - 视频转音频投递到 Telegram
//!
//! 启动顺序：配置 → 日志 → 草稿目录 → 校验 Bot → Worker → HTTP

use std::sync::Arc;

use podcastbot::application::{
    AcquisitionPipeline, AudioUploaderPort, DeliveryAdapter, PipelineConfig,
};
use podcastbot::config::{load_config, print_config, AppConfig, DeliveryMode};
use podcastbot::domain::ChatId;
use podcastbot::infrastructure::adapters::{
    BotAudioUploader, CommandAudioUploader, CommandUploaderConfig, FfmpegTagger, ScratchDir,
    TelegramBotClient, TelegramBotClientConfig, YtDlpResolver, YtDlpResolverConfig,
};
use podcastbot::infrastructure::http::{AppState, HttpServer, ServerConfig};
use podcastbot::infrastructure::worker::{
    JobDispatcher, JobWorker, RelayForwarder, RelayForwarderConfig,
};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config);

    tracing::info!("Podcastbot v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 草稿目录创建失败直接退出
    let scratch = ScratchDir::create(&config.pipeline.scratch_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create scratch dir: {}", e))?;

    // 校验 Bot token，失败直接退出
    let bot_config = TelegramBotClientConfig::new(&config.telegram.bot_token)
        .with_base_url(&config.telegram.api_base_url)
        .with_timeout(config.telegram.timeout_secs);
    let bot = Arc::new(TelegramBotClient::new(bot_config)?);
    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to validate bot credentials: {}", e))?;
    tracing::info!(bot_id = me.id, username = ?me.username, "Bot authorized");

    // 下载流水线
    let resolver = Arc::new(YtDlpResolver::new(YtDlpResolverConfig {
        program: config.tools.ytdlp.clone(),
    }));
    let tagger = Arc::new(FfmpegTagger::new(&config.tools.ffmpeg));
    let pipeline_config =
        PipelineConfig::new(scratch.path()).with_audio_codec(&config.pipeline.audio_codec);
    let pipeline = Arc::new(AcquisitionPipeline::new(pipeline_config, resolver, tagger));

    // 投递方式
    let uploader: Arc<dyn AudioUploaderPort> = match config.delivery.mode {
        DeliveryMode::Direct => Arc::new(BotAudioUploader::new(bot.clone())),
        DeliveryMode::Relay => Arc::new(CommandAudioUploader::new(CommandUploaderConfig {
            program: config.delivery.upload_command.clone(),
            helper_name: config.delivery.helper_name.clone(),
        })),
    };
    tracing::info!(uploader = uploader.name(), "Delivery configured");
    let delivery = Arc::new(DeliveryAdapter::new(uploader));

    // 启动 Worker
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let dispatcher = Arc::new(JobDispatcher::new(job_tx));
    tokio::spawn(JobWorker::new(job_rx, pipeline, delivery).run());

    if config.delivery.mode == DeliveryMode::Relay {
        let mut relay_config = RelayForwarderConfig::new(ChatId(config.delivery.helper_chat_id));
        relay_config.poll_timeout_secs = config.telegram.poll_timeout_secs;
        tokio::spawn(RelayForwarder::new(bot.clone(), relay_config).run());
    }

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_path(&config.server.path);
    let state = AppState::new(dispatcher)
        .with_destinations(&config.destinations)
        .with_api_token(config.auth.required_token());

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志，RUST_LOG 优先于配置
fn init_logging(config: &AppConfig) {
    let log_filter = format!(
        "{},podcastbot={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

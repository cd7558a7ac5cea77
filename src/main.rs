// ==========================================
// 代购业务数据迁移 - 命令行入口
// ==========================================
// 无参数: 数据库路径固定，工作簿路径与工作表名来自 config_kv
// ==========================================

use agency_import::config::{ConfigManager, MigrationSettings};
use agency_import::db::get_default_db_path;
use agency_import::{logging, MigrationPipeline, SqliteMigrationStore, XlsxWorkbook};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", agency_import::APP_NAME);
    tracing::info!("系统版本: {}", agency_import::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let store = SqliteMigrationStore::new(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    let config = ConfigManager::from_connection(store.connection())
        .context("无法初始化配置管理器")?;
    let settings = MigrationSettings::load(&config)
        .await
        .context("读取迁移配置失败")?;

    tracing::info!("读取工作簿: {}", settings.workbook_path);
    let mut workbook = XlsxWorkbook::open(&settings.workbook_path)
        .with_context(|| format!("无法打开工作簿: {}", settings.workbook_path))?;

    let run_date = chrono::Local::now().date_naive();
    let pipeline = MigrationPipeline::new(&store, settings);
    let report = pipeline
        .run(&mut workbook, run_date)
        .await
        .context("迁移执行失败")?;

    println!("{}", report.summary);
    Ok(())
}

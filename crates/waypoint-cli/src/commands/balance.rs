use anyhow::Result;
use waypoint_core::wallet::{WalletBalanceService, explorer_url};
use waypoint_infrastructure::ConfigService;
use waypoint_interaction::EtherscanClient;

pub async fn show(config: &ConfigService, address: &str) -> Result<()> {
    let settings = config.get_config()?;
    let client = EtherscanClient::from_config(&settings.etherscan);

    let balance = client.balance(address).await?;
    println!("💳 {}", address);
    println!("   Balance: {}", balance);
    println!("   {}", explorer_url(address));
    Ok(())
}

//! Prints the deploying account's pending nonce and the addresses its next two
//! contract creations will have.

use address_predictor::{predict, to_checksum, Account};
use chain_utils::{chain::Chain, config::DeployConfig};
use ethers::signers::Signer;
use eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = DeployConfig::from_env()?;
    let sender = config.signer()?.address();
    let chain = Chain::connect(Some(config.ethereum_url.clone())).await?;
    let nonce = chain.transaction_count(sender).await?;
    let predicted = predict(&Account::new(sender, nonce))?;

    println!("account:  {}", to_checksum(&sender));
    println!("nonce:    {}", nonce);
    println!("vault:    {}", to_checksum(&predicted.first));
    println!("strategy: {}", to_checksum(&predicted.second));

    Ok(())
}

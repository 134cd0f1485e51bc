use anyhow::Result;
use pay_guard::client::GatewayClient;
use pay_guard::config::GatewayConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let base_url = std::env::var("PAY_GUARD_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let config = GatewayConfig {
        merchant_id: std::env::var("MERCHANT_ID")?,
        integrity_salt: std::env::var("INTEGRITY_SALT")?,
    };
    let scenario = std::env::args().nth(1).unwrap_or_else(|| "success".to_string());

    println!("pay-guard Gateway Simulator");
    println!("===========================");
    println!("Server:   {}", base_url);
    println!("Scenario: {}", scenario);
    println!();

    let client = GatewayClient::new(&base_url, config);

    println!("Step 1: Initiating payment (campaign 42, 50000 paisa)...");
    let initiation = client.initiate("42", "50000").await?;
    println!("   [OK] txn_ref: {}", initiation.txn_ref);
    println!("   [OK] bill_reference: {}", initiation.bill_reference);
    println!();

    println!("Step 2: Forging the gateway redirect...");
    let callback = match scenario.as_str() {
        "success" => client.signed_callback(&initiation, "000", "Success"),
        "declined" => client.signed_callback(
            &initiation,
            "105",
            "Transaction declined by account provider",
        ),
        "tampered" => {
            // Signed as a decline, then the code is flipped after signing.
            // pay-guard must reject this with the error card.
            let mut forged = client.signed_callback(
                &initiation,
                "105",
                "Transaction declined by account provider",
            );
            forged.response_code = "000".to_string();
            forged
        }
        other => {
            anyhow::bail!(
                "Unknown scenario '{}' (expected success, declined, or tampered)",
                other
            );
        }
    };
    println!("   [OK] response_code: {}", callback.response_code);
    println!();

    println!("Step 3: Delivering callback...");
    let card = client.send_callback(&callback).await?;
    println!("   [OK] Card received:");
    println!("{}", serde_json::to_string_pretty(&card)?);
    println!();

    println!("Step 4: Redelivering the same callback (gateway retry)...");
    let replay = client.send_callback(&callback).await?;
    println!("   [OK] Replay card:");
    println!("{}", serde_json::to_string_pretty(&replay)?);

    Ok(())
}

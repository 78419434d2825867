//! Basic usage examples for TxAsm
//!
//! Everything here runs offline: sequence numbers are supplied explicitly
//! so no Horizon server is contacted.

use stellar_txasm::fee_calculator::FeeCalculator;
use stellar_txasm::prelude::*;

const SEED: &str = "SALCB22A3PL2JFI3GE62BM4S2TE64NJZP4GF2DBGPBC6QIUQ7GI7BRBN";
const DESTINATION: &str = "GDZ4R34MNVITLNZ4KVKBEANJU3UZZFZZLOX7ZVU5AWI7FEL5A6JWDM24";
const ISSUER: &str = "GDUWG5CZ6YJNWOPQB33DOKWVWSNHJAWPWOUNAEBVTM7QRJ66NGFYEFAJ";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== TxAsm Basic Usage Examples ===\n");

    example_payment()?;
    example_account_setup()?;
    example_fee_calculation()?;
    example_decode()?;

    Ok(())
}

fn example_payment() -> Result<(), Box<dyn std::error::Error>> {
    println!("Example 1: Signed payment");
    println!("-------------------------");

    let network = NetworkConfig::testnet();
    let keypair = KeyPair::from_secret_seed(SEED)?;
    println!("Source: {}", keypair.account_id());

    let mut builder = TransactionBuilder::new(keypair, network.clone());
    builder
        .pay(DESTINATION.parse()?, "12.5".parse()?, Asset::native())
        .memo(Memo::text("demo payment")?);

    // current account sequence; the transaction uses the next one
    let envelope = builder.build_envelope(Some(28515645087809560))?;
    println!("Sequence: {}", envelope.tx.sequence);
    println!("Fee: {} stroops", envelope.tx.fee);
    println!("Hash: {}", hex::encode(envelope.hash(&network)?));
    println!("Envelope: {}\n", envelope.to_base64()?);
    Ok(())
}

fn example_account_setup() -> Result<(), Box<dyn std::error::Error>> {
    println!("Example 2: Trustline and account options");
    println!("-----------------------------------------");

    let issuer: AccountId = ISSUER.parse()?;
    let usd = Asset::credit("USD", issuer)?;

    let mut builder = TransactionBuilder::new(KeyPair::from_secret_seed(SEED)?, NetworkConfig::testnet());
    builder.create_or_update_trust(usd, "1000".parse()?)?;
    builder
        .set_home_domain("example.com")?
        .set_thresholds(Some(2), Some(2), Some(1))
        .set_master_weight(2);
    builder.sequence(28515645087809561);

    let tx = builder.build(None)?;
    for operation in &tx.operations {
        println!("  {}", operation.operation_type().name());
    }
    println!("Three set-options calls, {} operations, fee {}\n", tx.operations.len(), tx.fee);
    Ok(())
}

fn example_fee_calculation() -> Result<(), Box<dyn std::error::Error>> {
    println!("Example 3: Fee calculation");
    println!("--------------------------");

    let calculator = FeeCalculator::with_base_fee(200);
    for ops in [1, 5, 100] {
        println!("{:>3} operations: {} stroops", ops, calculator.calculate_fee(ops)?);
    }
    println!();
    Ok(())
}

fn example_decode() -> Result<(), Box<dyn std::error::Error>> {
    println!("Example 4: Decoding an envelope");
    println!("-------------------------------");

    let network = NetworkConfig::testnet();
    let keypair = KeyPair::from_secret_seed(SEED)?;
    let source = keypair.account_id();
    let mut builder = TransactionBuilder::new(keypair, network.clone());
    builder.create_account(DESTINATION.parse()?, "20".parse()?);

    let encoded = builder.build_envelope(Some(1))?.to_base64()?;
    let decoded = TransactionEnvelope::from_base64(&encoded)?;
    println!("Operations: {}", decoded.tx.operations.len());
    println!("Signatures: {}", decoded.signatures.len());
    println!("Signed by source: {}", decoded.is_signed_by(&network, &source)?);
    Ok(())
}

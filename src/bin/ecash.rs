use chaum_ecash::config::EcashConfig;
use chaum_ecash::{
    Bank, Coin, DepositLedger, DepositOutcome, Disclose, Merchant, ProtocolParams, SecureRng,
    Wallet,
};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "ecash")]
#[command(about = "Withdraw, spend and deposit an anonymous coin", long_about = None)]
#[command(version)]
struct Args {
    /// Purchaser identity embedded in the coin
    #[arg(short, long, env = "ECASH_IDENTITY", default_value = "alice")]
    identity: String,

    /// Face value of the coin
    #[arg(short, long, env = "ECASH_AMOUNT", default_value = "20")]
    amount: u64,

    /// What happens after withdrawal
    #[arg(short, long, value_enum, default_value = "honest")]
    scenario: Scenario,

    /// Bank modulus size in bits (overrides the configuration file)
    #[arg(long)]
    key_bits: Option<usize>,

    /// Challenge positions per coin (overrides the configuration file)
    #[arg(long)]
    ris_length: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Spend once and deposit once
    Honest,
    /// Spend the same coin at two merchants and deposit both
    DoubleSpend,
    /// Spend once and deposit the same transcript twice
    DoubleDeposit,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = EcashConfig::from_env()?;
    if let Some(bits) = args.key_bits {
        config.bank.key_bits = bits;
    }
    if let Some(ris_length) = args.ris_length {
        config.protocol.ris_length = ris_length;
    }
    let params = config.protocol.params()?;

    let mut rng = SecureRng::new();
    info!(bits = config.bank.key_bits, "generating bank key");
    let bank = Bank::new(&config.bank, &mut rng)?;

    let coin = withdraw(&bank, &args, &params, &mut rng)?;
    println!("Withdrew coin {} worth {}", coin.id(), coin.amount());

    let mut ledger = bank.ledger(params.clone());
    let first = Merchant::new(bank.public_key().clone(), params.clone());
    let transcript = first.accept(&coin, &mut rng)?;
    println!("Merchant A accepted the coin");
    report(deposit(&mut ledger, &coin, transcript.clone())?);

    match args.scenario {
        Scenario::Honest => {}
        Scenario::DoubleSpend => {
            let second = Merchant::new(bank.public_key().clone(), params);
            let transcript = second.accept(&coin, &mut rng)?;
            println!("Merchant B accepted the same coin");
            report(deposit(&mut ledger, &coin, transcript)?);
        }
        Scenario::DoubleDeposit => {
            println!("Merchant A deposits the same transcript again");
            report(deposit(&mut ledger, &coin, transcript)?);
        }
    }

    Ok(())
}

fn withdraw(
    bank: &Bank,
    args: &Args,
    params: &ProtocolParams,
    rng: &mut SecureRng,
) -> chaum_ecash::Result<Coin> {
    let mut wallet = Wallet::new(&args.identity, bank.public_key().clone(), params.clone())?;
    let (id, blinded) = wallet.withdraw(args.amount, rng)?;
    let blind_signature = bank.sign(&blinded)?;
    wallet.complete(id, &blind_signature)?;
    Ok(wallet
        .take(id)
        .unwrap_or_else(|| unreachable!("completed coin is in the wallet")))
}

fn deposit(
    ledger: &mut DepositLedger,
    coin: &Coin,
    transcript: chaum_ecash::Transcript,
) -> chaum_ecash::Result<DepositOutcome> {
    ledger.deposit(coin.body(), coin.signature(), transcript)
}

fn report(outcome: DepositOutcome) {
    match outcome {
        DepositOutcome::Credited { amount } => println!("Deposit credited: {amount}"),
        DepositOutcome::Rejected(cheater) => println!("Deposit rejected, cheater: {cheater}"),
    }
}

pub mod arguments;

use {
    crate::arguments::{Arguments, Command, CreateArguments, OrderSource},
    anyhow::{Context as _, Result},
    clap::Parser,
    model::{
        DomainSeparator,
        asset::Asset,
        order::{Order, OrderBuilder},
        signature::EcdsaSignature,
    },
    std::{io::Write, path::Path, process::ExitCode},
    tokio::io::AsyncReadExt as _,
};

/// Parses the command line, sets up logging and runs the command, printing
/// its output to stdout.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::debug!("running order-cli with validated arguments:\n{}", args);

    match run(&args, &mut std::io::stdout().lock()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(?err, "command failed");
            ExitCode::FAILURE
        }
    }
}

pub async fn run(args: &Arguments, out: &mut dyn Write) -> Result<()> {
    match &args.command {
        Command::Create(create) => {
            let order = create_order(create)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&order)?)?;
        }
        Command::Hash { order, buyer_fee } => {
            let order = load_order(order).await?;
            writeln!(out, "{}", const_hex::encode_prefixed(order.hash()))?;
            if let Some(buyer_fee) = buyer_fee {
                let hash = order.buyer_fee_hash(*buyer_fee);
                writeln!(out, "{}", const_hex::encode_prefixed(hash))?;
            }
        }
        Command::Sign {
            order,
            key,
            buyer_fee,
        } => {
            let order = load_order(order).await?;
            let signer = &key.private_key;
            if buyer_fee.is_none() && signer.address() != order.owner() {
                tracing::warn!(
                    signer = %signer.address(),
                    owner = %order.owner(),
                    "signer is not the order owner, the signature will not verify"
                );
            }
            let signature = match buyer_fee {
                Some(buyer_fee) => order.sign_buyer_fee(*buyer_fee, signer).await?,
                None => order.sign(signer).await?,
            };
            writeln!(out, "{signature}")?;
        }
        Command::Verify {
            order,
            signature,
            buyer_fee,
            signer,
        } => {
            let order = load_order(order).await?;
            let signature: EcdsaSignature = signature.parse().context("malformed signature")?;
            let valid = match (buyer_fee, signer) {
                (Some(buyer_fee), Some(signer)) => {
                    order.verify_buyer_fee(*buyer_fee, &signature, *signer)
                }
                _ => order.verify(&signature),
            }
            .context("failed to recover signer")?;
            writeln!(out, "{valid}")?;
        }
        Command::SignTyped {
            order,
            key,
            chain_id,
            verifying_contract,
            buyer_fee,
        } => {
            let order = load_order(order).await?;
            let domain = DomainSeparator::sale(*chain_id, *verifying_contract);
            tracing::debug!(?domain, "signing typed data");
            let signature = match buyer_fee {
                Some(buyer_fee) => {
                    order
                        .sign_typed_buyer_fee(&domain, *buyer_fee, &key.private_key)
                        .await?
                }
                None => order.sign_typed(&domain, &key.private_key).await?,
            };
            writeln!(out, "{signature}")?;
        }
    }
    Ok(())
}

fn create_order(args: &CreateArguments) -> Result<Order> {
    let mut builder = OrderBuilder::default()
        .with_owner(args.owner)
        .with_sell_asset(Asset::new(
            args.sell_token,
            args.sell_token_id,
            args.sell_asset_type,
        ))
        .with_buy_asset(Asset::new(
            args.buy_token,
            args.buy_token_id,
            args.buy_asset_type,
        ))
        .with_selling(args.selling)
        .with_buying(args.buying)
        .with_seller_fee(args.seller_fee);
    if let Some(salt) = args.salt {
        builder = builder.with_salt(salt);
    }
    builder.build().context("failed to generate salt")
}

async fn load_order(source: &OrderSource) -> Result<Order> {
    let json = read_source(&source.order).await?;
    let order: Order = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse order from {}", source.order.display()))?;
    tracing::debug!(hash = %order.hash(), "loaded order");
    Ok(order)
}

async fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut json = String::new();
        tokio::io::stdin()
            .read_to_string(&mut json)
            .await
            .context("failed to read order from stdin")?;
        return Ok(json);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read order file {}", path.display()))
}

//! CLI arguments for the `order-cli` binary.

use {
    alloy::{
        primitives::{Address, U256},
        signers::local::PrivateKeySigner,
    },
    clap::{Args, Parser, Subcommand},
    model::asset::AssetType,
    number::serialization::parse_hex_or_decimal,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::Level,
};

/// Create, hash, sign and verify NFT market orders.
#[derive(Parser)]
#[command(version)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn")]
    pub log_filter: String,

    /// Events more severe than this level are written to stderr instead of
    /// stdout, which carries the command output. The default keeps every
    /// level except TRACE off stdout.
    #[clap(long, env, default_value = "trace")]
    pub log_stderr_threshold: Level,

    /// Output log events as JSON.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            Some(self.log_stderr_threshold),
            self.use_json_logs,
        )
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a new order and print its wire JSON.
    Create(CreateArguments),
    /// Print the message digest of an order.
    Hash {
        #[clap(flatten)]
        order: OrderSource,

        /// Also print the digest binding this buyer fee to the order.
        #[clap(long, value_parser = parse_hex_or_decimal)]
        buyer_fee: Option<U256>,
    },
    /// Sign the message digest of an order as a personal message.
    Sign {
        #[clap(flatten)]
        order: OrderSource,

        #[clap(flatten)]
        key: KeyArguments,

        /// Sign the buyer fee digest for this fee instead of the order digest.
        #[clap(long, value_parser = parse_hex_or_decimal)]
        buyer_fee: Option<U256>,
    },
    /// Check a personal message signature against an order.
    Verify {
        #[clap(flatten)]
        order: OrderSource,

        /// 65 bytes `r || s || v` as 0x prefixed hex.
        #[clap(long)]
        signature: String,

        /// Verify a buyer fee signature for this fee instead of the order
        /// signature.
        #[clap(long, value_parser = parse_hex_or_decimal, requires = "signer")]
        buyer_fee: Option<U256>,

        /// Expected signer of the buyer fee signature.
        #[clap(long, requires = "buyer_fee")]
        signer: Option<Address>,
    },
    /// Sign a sale order as EIP-712 typed data.
    SignTyped {
        #[clap(flatten)]
        order: OrderSource,

        #[clap(flatten)]
        key: KeyArguments,

        #[clap(long, env)]
        chain_id: u64,

        /// Address of the exchange contract.
        #[clap(long, env)]
        verifying_contract: Address,

        /// Sign the `BuyerFee` struct for this fee instead of the order.
        #[clap(long, value_parser = parse_hex_or_decimal)]
        buyer_fee: Option<U256>,
    },
}

#[derive(Args)]
pub struct OrderSource {
    /// Path of a wire JSON order, `-` reads it from stdin.
    #[clap(long, default_value = "-")]
    pub order: PathBuf,
}

#[derive(Args)]
pub struct KeyArguments {
    /// Hex encoded private key of the signer.
    #[clap(long, env, hide_env_values = true)]
    pub private_key: PrivateKeySigner,
}

#[derive(Args)]
pub struct CreateArguments {
    #[clap(long)]
    pub owner: Address,

    /// Random unless specified.
    #[clap(long, value_parser = parse_hex_or_decimal)]
    pub salt: Option<U256>,

    #[clap(long)]
    pub sell_token: Address,

    #[clap(long, value_parser = parse_hex_or_decimal, default_value = "0")]
    pub sell_token_id: U256,

    /// One of ETH, ERC20, ERC1155 or ERC721.
    #[clap(long)]
    pub sell_asset_type: AssetType,

    #[clap(long)]
    pub buy_token: Address,

    #[clap(long, value_parser = parse_hex_or_decimal, default_value = "0")]
    pub buy_token_id: U256,

    #[clap(long)]
    pub buy_asset_type: AssetType,

    #[clap(long, value_parser = parse_hex_or_decimal)]
    pub selling: U256,

    #[clap(long, value_parser = parse_hex_or_decimal)]
    pub buying: U256,

    #[clap(long, value_parser = parse_hex_or_decimal, default_value = "0")]
    pub seller_fee: U256,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self { logging, command } = self;

        writeln!(f, "log_filter: {}", logging.log_filter)?;
        writeln!(f, "log_stderr_threshold: {}", logging.log_stderr_threshold)?;
        writeln!(f, "use_json_logs: {}", logging.use_json_logs)?;
        match command {
            Command::Create(args) => {
                writeln!(f, "command: create")?;
                writeln!(f, "owner: {}", args.owner)?;
                display_option(f, "salt", &args.salt)?;
            }
            Command::Hash { order, buyer_fee } => {
                writeln!(f, "command: hash")?;
                writeln!(f, "order: {}", order.order.display())?;
                display_option(f, "buyer_fee", buyer_fee)?;
            }
            Command::Sign {
                order, buyer_fee, ..
            } => {
                writeln!(f, "command: sign")?;
                writeln!(f, "order: {}", order.order.display())?;
                writeln!(f, "private_key: SECRET")?;
                display_option(f, "buyer_fee", buyer_fee)?;
            }
            Command::Verify {
                order,
                buyer_fee,
                signer,
                ..
            } => {
                writeln!(f, "command: verify")?;
                writeln!(f, "order: {}", order.order.display())?;
                display_option(f, "buyer_fee", buyer_fee)?;
                display_option(f, "signer", signer)?;
            }
            Command::SignTyped {
                order,
                chain_id,
                verifying_contract,
                buyer_fee,
                ..
            } => {
                writeln!(f, "command: sign-typed")?;
                writeln!(f, "order: {}", order.order.display())?;
                writeln!(f, "private_key: SECRET")?;
                writeln!(f, "chain_id: {chain_id}")?;
                writeln!(f, "verifying_contract: {verifying_contract}")?;
                display_option(f, "buyer_fee", buyer_fee)?;
            }
        }
        Ok(())
    }
}

pub fn display_option(
    f: &mut Formatter<'_>,
    name: &str,
    option: &Option<impl Display>,
) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn display_hides_private_key() {
        let args = Arguments::try_parse_from([
            "order-cli",
            "sign",
            "--order",
            "order.json",
            "--private-key",
            KEY,
        ])
        .unwrap();
        let display = args.to_string();
        assert!(display.contains("private_key: SECRET"));
        assert!(!display.contains(&KEY[2..]));
    }

    #[test]
    fn parses_create() {
        let args = Arguments::try_parse_from([
            "order-cli",
            "create",
            "--owner",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "--sell-token",
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
            "--sell-token-id",
            "0x10",
            "--sell-asset-type",
            "erc721",
            "--buy-token",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "--buy-asset-type",
            "ERC20",
            "--selling",
            "1",
            "--buying",
            "2000000000000000000",
        ])
        .unwrap();
        let Command::Create(create) = args.command else {
            panic!("expected create command");
        };
        assert_eq!(create.sell_token_id, U256::from(16));
        assert_eq!(create.sell_asset_type, AssetType::Erc721);
        assert_eq!(create.buy_token_id, U256::ZERO);
        assert_eq!(create.buy_asset_type, AssetType::Erc20);
        assert_eq!(create.seller_fee, U256::ZERO);
        assert_eq!(create.salt, None);
        assert_eq!(
            create.buying,
            U256::from(2_000_000_000_000_000_000_u64)
        );
    }

    #[test]
    fn verify_buyer_fee_requires_signer() {
        assert!(
            Arguments::try_parse_from([
                "order-cli",
                "verify",
                "--signature",
                "0x00",
                "--buyer-fee",
                "150",
            ])
            .is_err()
        );
    }

    #[test]
    fn logs_default_to_stderr() {
        let args = Arguments::try_parse_from(["order-cli", "hash"]).unwrap();
        assert_eq!(args.logging.log_stderr_threshold, Level::TRACE);
        assert_eq!(args.logging.log_filter, "warn");
    }

    #[test]
    fn order_defaults_to_stdin() {
        let args = Arguments::try_parse_from(["order-cli", "hash"]).unwrap();
        let Command::Hash { order, buyer_fee } = args.command else {
            panic!("expected hash command");
        };
        assert_eq!(order.order, PathBuf::from("-"));
        assert_eq!(buyer_fee, None);
    }
}

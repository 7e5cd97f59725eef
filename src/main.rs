//! Futures Ledger Simulation.
//!
//! Walks a single contract through its lifecycle: creation, oracle pricing,
//! open and close with pnl, short liquidation, and a rejected open that leaves
//! no trace. Set `RUST_LOG=futures_ledger=debug` to see every event.

use futures_ledger::*;
use std::error::Error;
use tracing_subscriber::EnvFilter;

const HOUSE_LIQUIDITY: Amount = 1_000_000;
const STARTING_BALANCE: Amount = 1_000_000;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Futures Ledger Simulation");
    println!("Fixed 2x Leverage, Oracle Priced, External Custody\n");

    let (mut ledger, mut token, pet) = setup()?;

    scenario_1_open_and_close(&mut ledger, &mut token, pet)?;
    scenario_2_short_liquidation(&mut ledger, &mut token, pet)?;
    scenario_3_long_is_never_liquidatable(&mut ledger, &mut token, pet)?;
    scenario_4_rejected_open_rolls_back(ledger, token, pet)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn setup() -> Result<(Ledger, TokenLedger, ContractId), Box<dyn Error>> {
    let config = LedgerConfig::default();
    let custody = config.custody_account.clone();
    let mut ledger = Ledger::new(Principal::new("owner"), config);
    let mut token = TokenLedger::new(TokenId::new("USDx"));

    let owner = ExecutionContext::at("owner", 1);
    ledger.set_collateral_token(&owner, token.token_id().clone())?;
    ledger.set_oracle(&owner, Principal::new("oracle"))?;
    let pet = ledger.create_contract(&owner, "PET", 1000)?;
    ledger.update_price(&ExecutionContext::at("oracle", 1), "PET", 1000)?;

    for trader in ["alice", "bob", "carol", "dave"] {
        token.mint(&Principal::new(trader), STARTING_BALANCE)?;
    }
    token.mint(&custody, HOUSE_LIQUIDITY)?;

    let contract = ledger.get_contract(pet).ok_or("contract missing after create")?;
    println!(
        "  Contract {} {} expires at height {}",
        contract.id, contract.symbol, contract.expiry_height
    );
    println!("  Traders funded with {} USDx, custody holds {}\n", STARTING_BALANCE, HOUSE_LIQUIDITY);
    Ok((ledger, token, pet))
}

/// Long opened at 1000, closed at 1100.
fn scenario_1_open_and_close(
    ledger: &mut Ledger,
    token: &mut TokenLedger,
    pet: ContractId,
) -> Result<(), Box<dyn Error>> {
    println!("Scenario 1: Open and Close\n");

    let alice = ExecutionContext::at("alice", 2);
    let position = ledger.open_position(&alice, pet, Side::Long, 1000, token)?;
    println!(
        "  Alice opens {} {} @ {}, collateral {}",
        position.side, position.size, position.entry_price, position.collateral_amount
    );

    ledger.update_price(&ExecutionContext::at("oracle", 3), "PET", 1100)?;
    println!(
        "  Price moves to 1100, unrealized pnl {}",
        ledger.get_position_pnl(&alice.caller, pet)?
    );

    let closed = ledger.close_position(&ExecutionContext::at("alice", 4), pet, token)?;
    println!("  Closed @ {}: pnl {}, payout {}", closed.exit_price, closed.pnl, closed.payout);
    println!("  Alice balance: {}\n", token.balance_of(&alice.caller));
    Ok(())
}

/// Short opened at 1000, liquidated once price reaches its threshold.
fn scenario_2_short_liquidation(
    ledger: &mut Ledger,
    token: &mut TokenLedger,
    pet: ContractId,
) -> Result<(), Box<dyn Error>> {
    println!("Scenario 2: Short Liquidation\n");

    ledger.update_price(&ExecutionContext::at("oracle", 5), "PET", 1000)?;
    let bob = ExecutionContext::at("bob", 5);
    ledger.open_position(&bob, pet, Side::Short, 1000, token)?;
    let threshold = ledger.calculate_liquidation_price(&bob.caller, pet)?;
    println!("  Bob opens SHORT 1000 @ 1000, liquidation price {}", threshold);

    let carol = ExecutionContext::at("carol", 6);
    for price in [20_000, 50_000, threshold] {
        ledger.update_price(&ExecutionContext::at("oracle", 6), "PET", price)?;
        match ledger.liquidate_position(&carol, &bob.caller, pet, token) {
            Ok(result) => println!("  {}: liquidated by carol, reward {}", price, result.reward),
            Err(err) => println!("  {}: {} ({:?})", price, err, err.code()),
        }
    }
    println!("  Carol balance: {}\n", token.balance_of(&carol.caller));
    Ok(())
}

/// A fully collateralized long's threshold clamps to zero.
fn scenario_3_long_is_never_liquidatable(
    ledger: &mut Ledger,
    token: &mut TokenLedger,
    pet: ContractId,
) -> Result<(), Box<dyn Error>> {
    println!("Scenario 3: Long Liquidation Threshold\n");

    ledger.update_price(&ExecutionContext::at("oracle", 7), "PET", 1000)?;
    let alice = ExecutionContext::at("alice", 7);
    ledger.open_position(&alice, pet, Side::Long, 500, token)?;
    println!(
        "  Alice opens LONG 500 @ 1000, liquidation price {}",
        ledger.calculate_liquidation_price(&alice.caller, pet)?
    );

    ledger.update_price(&ExecutionContext::at("oracle", 8), "PET", 1)?;
    if let Err(err) = ledger.liquidate_position(&ExecutionContext::at("bob", 8), &alice.caller, pet, token) {
        println!("  Price at 1: {} ({:?})", err, err.code());
    }
    if let Some(health) = ledger.get_position_health(&alice.caller, pet)? {
        println!("  Position health at 1: {}\n", health.round_dp(4));
    }
    Ok(())
}

/// A frozen account makes the custody transfer fail; nothing is recorded.
fn scenario_4_rejected_open_rolls_back(
    ledger: Ledger,
    mut token: TokenLedger,
    pet: ContractId,
) -> Result<(), Box<dyn Error>> {
    println!("Scenario 4: Rejected Open\n");

    let dave = Principal::new("dave");
    token.freeze(&dave);
    let host = Host::new(ledger, token);
    let events_before = host.read(|ledger, _| ledger.events().len());

    let err = host
        .open_position(&ExecutionContext::new(dave.clone(), BlockHeight(9)), pet, Side::Short, 100)
        .err()
        .ok_or("frozen account was able to open")?;
    println!("  Dave's open rejected: {} ({:?})", err, err.code());

    host.read(|ledger, token| {
        println!(
            "  Position recorded: {}, balance {}, events {} -> {}",
            ledger.get_position(&dave, pet).is_some(),
            token.balance_of(&dave),
            events_before,
            ledger.events().len()
        );
        println!(
            "  Open positions: {}, collateral locked: {}",
            ledger.open_position_count(),
            ledger.total_collateral_locked()
        );
    });

    let state = host.into_inner();
    println!("\n  Last events:");
    println!("{}", serde_json::to_string_pretty(state.ledger.recent_events(3))?);
    Ok(())
}

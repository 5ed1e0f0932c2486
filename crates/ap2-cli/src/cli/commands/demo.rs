//! In-process purchase: every protocol step against the demo network.

use ap2_agents::LocalNetwork;
use ap2_core::types::IntentMandate;
use ap2_core::{Ap2Config, Ap2Error, TaskState};
use chrono::{Duration, Utc};

use super::super::args::DemoArgs;
use crate::exit_codes::{FAILURE, SUCCESS};

pub async fn run(args: DemoArgs, config: Ap2Config) -> anyhow::Result<i32> {
    let otp = args
        .otp
        .clone()
        .unwrap_or_else(|| config.challenge.expected_response.clone());
    let network = LocalNetwork::demo(config);
    let mut session = network.shopping_session()?;

    println!("[1/9] find products: {:?}", args.query);
    let intent = IntentMandate::new(args.query.clone(), Utc::now() + Duration::hours(1));
    let cart_id = {
        let carts = session.find_products(intent).await?;
        for cart in carts {
            let total = &cart.contents.payment_request.details.total;
            println!(
                "      {} {} {:.2} {}",
                cart.id(),
                total.label,
                total.amount.value,
                total.amount.currency
            );
        }
        carts
            .first()
            .map(|cart| cart.id().to_string())
            .ok_or_else(|| Ap2Error::not_found("cart"))?
    };

    println!("[2/9] choose cart {cart_id}");
    session.choose_cart(&cart_id)?;

    println!("[3/9] shipping address for {}", args.user);
    let address = session.fetch_shipping_address(&args.user).await?;
    let updated = session.update_cart(address).await?;
    let total = &updated.contents.payment_request.details.total;
    println!(
        "      updated cart total {:.2} {}",
        total.amount.value, total.amount.currency
    );

    println!("[4/9] eligible payment methods");
    let aliases = session.fetch_payment_methods(&args.user).await?;
    for alias in &aliases {
        println!("      {alias}");
    }
    let alias = match args.payment_method.clone().or_else(|| aliases.first().cloned()) {
        Some(alias) => alias,
        None => {
            eprintln!("no eligible payment method for {}", args.user);
            return Ok(FAILURE);
        }
    };

    println!("[5/9] credential token for {alias:?}");
    session
        .fetch_payment_credential_token(&args.user, &alias)
        .await?;

    println!("[6/9] create and sign payment mandate");
    let mandate_id = session.create_payment_mandate(&args.user)?.id().to_string();
    session.sign_mandates_on_user_device()?;
    println!("      mandate {mandate_id}");

    println!("[7/9] bind token to signed mandate");
    session.send_signed_payment_mandate().await?;

    println!("[8/9] initiate payment");
    let task = session.initiate_payment().await?;
    println!("      task {} {}", task.id, task.state().as_str());
    if task.state() != TaskState::InputRequired {
        eprintln!("expected a challenge, task ended {}", task.state().as_str());
        return Ok(FAILURE);
    }

    println!("[9/9] answer challenge");
    let done = session.initiate_payment_with_otp(&otp).await?;
    let status = done.status_text().unwrap_or_default();
    println!("      task {} {}: {}", done.id, done.state().as_str(), status);

    Ok(match done.state() {
        TaskState::Completed => SUCCESS,
        _ => FAILURE,
    })
}

use crate::infra::{InMemoryOrderRepository, SimulatedCreditService};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use velo_orders::error::AppError;
use velo_orders::orders::session;
use velo_orders::orders::{
    format_brl, CarConfiguration, CheckoutRequest, CheckoutService, CustomerInfo, ExteriorColor,
    InteriorColor, OptionalFeature, OrderError, PaymentMethod, PaymentQuote, PriceTable,
    WheelType,
};

#[derive(Args, Debug, Default)]
pub(crate) struct QuoteArgs {
    /// Restore the configuration from a saved configurator snapshot first.
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Exterior color (glacier-blue, midnight-black, lunar-white)
    #[arg(long)]
    pub(crate) exterior: Option<ExteriorColor>,
    /// Interior color (carbon-black, deep-blue)
    #[arg(long)]
    pub(crate) interior: Option<InteriorColor>,
    /// Wheel set (aero, sport)
    #[arg(long)]
    pub(crate) wheels: Option<WheelType>,
    /// Optional feature to add; repeat for several (precision-park, flux-capacitor)
    #[arg(long = "optional")]
    pub(crate) optionals: Vec<OptionalFeature>,
    /// Payment method (avista or financiamento)
    #[arg(long, value_parser = parse_payment_method, default_value = "avista")]
    pub(crate) payment: PaymentMethod,
    /// Down payment in BRL when financing
    #[arg(long, default_value = "0")]
    pub(crate) down_payment: Decimal,
    /// Write the resulting configuration to a snapshot file.
    #[arg(long)]
    pub(crate) save_snapshot: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Score returned by the simulated credit bureau
    #[arg(long, default_value_t = 720)]
    pub(crate) score: i64,
    /// Payment method (avista or financiamento)
    #[arg(long, value_parser = parse_payment_method, default_value = "financiamento")]
    pub(crate) payment: PaymentMethod,
    /// Down payment in BRL when financing
    #[arg(long, default_value = "10000")]
    pub(crate) down_payment: Decimal,
}

pub(crate) fn parse_payment_method(raw: &str) -> Result<PaymentMethod, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "avista" | "cash" => Ok(PaymentMethod::Cash),
        "financiamento" | "financing" => Ok(PaymentMethod::Financing),
        other => Err(format!(
            "unknown payment method '{other}' (expected avista or financiamento)"
        )),
    }
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let configuration = quote_configuration(&args)?;
    let prices = PriceTable::STANDARD;
    let vehicle_price = prices.total_price(&configuration);

    if args.payment == PaymentMethod::Financing
        && (args.down_payment < Decimal::ZERO || args.down_payment > vehicle_price)
    {
        return Err(AppError::Usage(format!(
            "down payment must be between {} and {}",
            format_brl(Decimal::ZERO),
            format_brl(vehicle_price)
        )));
    }

    let quote = PaymentQuote::build(&prices, &configuration, args.payment, args.down_payment);
    render_quote(&configuration, &quote);

    if let Some(path) = args.save_snapshot {
        std::fs::write(&path, session::save(&configuration)?)?;
        println!("\nSnapshot saved to {}", path.display());
    }
    Ok(())
}

fn quote_configuration(args: &QuoteArgs) -> Result<CarConfiguration, AppError> {
    let mut configuration = match &args.snapshot {
        Some(path) => session::restore(&std::fs::read_to_string(path)?)?,
        None => CarConfiguration::default(),
    };

    if let Some(exterior) = args.exterior {
        configuration.exterior_color = exterior;
    }
    if let Some(interior) = args.interior {
        configuration.interior_color = interior;
    }
    if let Some(wheels) = args.wheels {
        configuration.wheel_type = wheels;
    }
    Ok(configuration.with_optionals(args.optionals.iter().copied()))
}

fn render_quote(configuration: &CarConfiguration, quote: &PaymentQuote) {
    println!("Velô configuration");
    println!(
        "- Exterior {} | interior {} | {} wheels",
        configuration.exterior_color.label(),
        configuration.interior_color.code(),
        configuration.wheel_type.code()
    );
    println!("Price breakdown:");
    for line in &quote.lines {
        println!("  - {}: {}", line.item, format_brl(line.amount));
    }
    println!("Vehicle price: {}", format_brl(quote.vehicle_price));
    println!("Payment: {}", quote.payment_method.label());

    if let Some(schedule) = &quote.financing {
        println!("  Down payment: {}", format_brl(quote.down_payment));
        println!("  Financed amount: {}", format_brl(schedule.financed_amount));
        println!("  12x of {}", format_brl(schedule.installment));
        println!("  Interest: {}", format_brl(schedule.interest));
    }
    println!("Final price: {}", format_brl(quote.final_price));
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        score,
        payment,
        down_payment,
    } = args;

    println!("Velô checkout demo (simulated bureau score {score})");

    let repository = Arc::new(InMemoryOrderRepository::default());
    let service = CheckoutService::new(repository.clone(), Arc::new(SimulatedCreditService { score }));
    let request = demo_checkout_request(payment, down_payment);

    let quote = service.quote(&request.configuration, payment, down_payment);
    render_quote(&request.configuration, &quote);

    let order = match service.submit_order(request).await {
        Ok(order) => order,
        Err(OrderError::Validation(err)) => {
            for violation in &err.violations {
                println!("  Invalid {}: {}", violation.field.as_str(), violation.message);
            }
            return Ok(());
        }
        Err(err) => {
            println!("\nSubmission rejected: {}", err.user_message());
            return Ok(());
        }
    };

    println!(
        "\nOrder {} -> {} ({} stored)",
        order.id,
        order.status.label(),
        repository.len()
    );
    if let Some(installment) = order.installment_value {
        println!("  12x of {}", format_brl(installment));
    }
    println!("  Total: {}", format_brl(order.total_price));

    let lookup_code = order.id.as_str().to_lowercase();
    match service.find_order(&lookup_code).await {
        Ok(Some(found)) => match serde_json::to_string_pretty(&found) {
            Ok(json) => println!("  Lookup by '{lookup_code}':\n{json}"),
            Err(err) => println!("  Order payload unavailable: {err}"),
        },
        Ok(None) => println!("  Lookup by '{lookup_code}' found nothing"),
        Err(err) => println!("  Order store unavailable: {err}"),
    }
    Ok(())
}

fn demo_checkout_request(payment_method: PaymentMethod, down_payment: Decimal) -> CheckoutRequest {
    CheckoutRequest {
        configuration: CarConfiguration {
            exterior_color: ExteriorColor::LunarWhite,
            interior_color: InteriorColor::CarbonBlack,
            wheel_type: WheelType::Sport,
            optionals: Default::default(),
        }
        .with_optionals([OptionalFeature::PrecisionPark]),
        customer: CustomerInfo {
            name: "Helena".to_string(),
            surname: "Prado".to_string(),
            email: "helena.prado@example.com".to_string(),
            phone: "(21) 99876-1234".to_string(),
            cpf: "111.444.777-35".to_string(),
            store: "Velô Barra - Av. das Américas, 500".to_string(),
        },
        payment_method,
        down_payment,
        accepted_terms: true,
    }
}

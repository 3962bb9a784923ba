//! # 軟包裝報價完整範例
//!
//! 同一個袋型分別以數碼、柯式、凹版報價，並把歷史記錄寫入記憶體。
//!
//! ```text
//! RUST_LOG=quote_calc=debug cargo run --example quote_demo
//! ```

use flexquote::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    println!("📦 ===== 軟包裝報價範例 =====");
    println!();

    // ========== 1. 參考資料 ==========
    println!("📚 步驟 1: 建立參考目錄");
    let catalog = Arc::new(create_catalog());
    println!("   ✓ 產品子類: {}", catalog.product_subcategories.len());
    println!("   ✓ 印刷方式: {}", catalog.printing_types.len());
    println!();

    // ========== 2. 客戶與匯率 ==========
    let tier = CustomerTier::new(1, "Gold")
        .with_margins(Decimal::from(35), Decimal::from(30), Decimal::from(25))
        .with_discounts(Decimal::from(3000), Decimal::from(5), Decimal::from(20000), Decimal::from(10));
    let context = PricingContext::new(ExchangeRate::new(Decimal::new(72, 1)))
        .with_customer("CUST-001", Some(tier));
    println!("👤 步驟 2: 客戶 CUST-001（Gold），匯率 7.2");
    println!();

    // ========== 3. 報價 ==========
    let calculator = Arc::new(QuotationCalculator::new(catalog, QuoteConfig::default()));
    let sink = Arc::new(InMemoryHistorySink::new());
    let quoter = RecordingQuoter::new(calculator, HistoryDispatcher::new(sink.clone()));

    let size = Size::new(Decimal::from(150), Decimal::from(200)).with_gusset(Decimal::from(80));
    let mut handles = Vec::new();

    for (printing_type_id, label, cases) in [
        (1, "數碼", vec![Case::new(1, 200), Case::new(3, 500)]),
        (2, "柯式", vec![Case::new(4, 3000), Case::new(10, 5000)]),
        (3, "凹版", vec![Case::new(1, 20_000), Case::new(1, 50_000)]),
    ] {
        println!("🖨️  步驟 3: {}印刷報價", label);
        let request = cases.into_iter().fold(
            QuoteRequest::new(2, printing_type_id, size).with_option(colors()).with_option(layers()?),
            QuoteRequest::with_case,
        );

        match quoter.quote_with_handle(&request, &context) {
            Ok((response, handle)) => {
                print_response(&response);
                handles.extend(handle);
            }
            Err(err) if err.requires_manual_quote() => println!("   ⚠ {}", err),
            Err(err) => return Err(err.into()),
        }
        println!();
    }

    // ========== 4. 歷史記錄 ==========
    println!("🗂️  步驟 4: 等待歷史記錄寫入");
    for handle in handles {
        let report = handle.await?;
        println!("   ✓ 成功 {} 筆，失敗 {} 筆", report.written, report.failed);
    }
    println!("   ✓ 共保存 {} 筆報價記錄", sink.len().await);

    if let Some(record) = sink.records().await.first() {
        println!();
        println!("📄 第一筆記錄 (JSON):");
        println!("{}", serde_json::to_string_pretty(record)?);
    }

    Ok(())
}

fn print_response(response: &QuoteResponse) {
    for (index, breakdown) in response.per_case_breakdown.iter().enumerate() {
        let weight = response.total_weights_kg[index]
            .map(|kg| format!("{}kg", kg.round_dp(2)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   批次 {}: 成本 ¥{} → 報價 ¥{} / ${}，重量 {}",
            index + 1,
            breakdown.total_cost_cny.round_dp(2),
            response.total_prices_cny[index].round_dp(2),
            response.total_prices_usd[index].round_dp(2),
            weight
        );
        if let Some(matched) = breakdown.modulus {
            println!(
                "      模數 {}（周長 {}mm）{}",
                matched.modulus,
                matched.perimeter,
                if breakdown.modulus_unmatched { "⚠ 未匹配" } else { "" }
            );
        }
        for plate in &breakdown.plates {
            println!(
                "      版輥 {:?}: 長 {}mm，周長 {}mm × {}",
                plate.web, plate.plate_length_mm, plate.perimeter_mm, plate.repeats
            );
        }
    }
}

fn pet() -> MaterialSuboption {
    MaterialSuboption::new(31, "PET", Decimal::new(14, 1), Decimal::from(12), Decimal::new(35, 1))
}

fn pe() -> MaterialSuboption {
    MaterialSuboption::new(32, "PE", Decimal::new(92, 2), Decimal::from(80), Decimal::new(48, 1))
}

fn colors() -> StandardOption {
    StandardOption::new(2, "Color")
        .with_suboption(Suboption::new(21, "Cyan", Decimal::new(2, 1)))
        .with_suboption(Suboption::new(22, "Magenta", Decimal::new(2, 1)))
        .with_suboption(Suboption::new(23, "Yellow", Decimal::new(2, 1)))
        .with_suboption(Suboption::new(24, "Black", Decimal::new(2, 1)))
}

fn layers() -> Result<MaterialOption> {
    let layers = MaterialLayers::from_selections([Some(pet()), Some(pe())])?;
    Ok(MaterialOption::new(4, "Layer Material").with_layers(layers))
}

fn create_catalog() -> ReferenceCatalog {
    let materials = MaterialChoices {
        id: 4,
        name: "Layer Material".to_string(),
        is_required: true,
        layers: vec![vec![pet()], vec![pe()]],
    };

    ReferenceCatalog::new()
        .with_subcategory(ProductSubcategory::new(1, "3 Side Seal Bag"))
        .with_subcategory(ProductSubcategory::new(2, "Flat Bottom Bag").with_gusset(true))
        .with_printing_type(PrintingType::new(1, PrintingTechnology::Digital))
        .with_printing_type(PrintingType::new(2, PrintingTechnology::Offset))
        .with_printing_type(PrintingType::new(3, PrintingTechnology::Gravure))
        .with_option(CatalogOption::Standard(colors()))
        .with_option(CatalogOption::Material(materials))
}

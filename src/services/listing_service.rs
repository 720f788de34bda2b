// src/services/listing_service.rs
//
// Transformação das linhas das listagens (publicações, TV, TV aberta).
// Todas passam pelo mesmo cálculo de preço.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{
    common::error::AppError,
    models::{
        listing::{
            BroadcastRecord, BroadcastRow, ListicleRow, NamedRef, PublicationFile, PublicationItem,
            PublicationRow, RawPrice, TelevisionRecord, TelevisionRow,
        },
        pricing::PricingRule,
    },
    services::price_calculator::{calculate_with, TracingObserver},
};

const PUBLICATIONS_FILE: &str = "data.json";
const TELEVISION_FILE: &str = "data1.csv";
const BROADCAST_FILE: &str = "data2.csv";

#[derive(Clone)]
pub struct ListingService {
    data_dir: PathBuf,
}

impl ListingService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub async fn publications(&self, rules: Option<&[PricingRule]>) -> Result<Vec<PublicationRow>, AppError> {
        let items = self.load_publication_items().await?;
        tracing::info!(items = items.len(), custom_rules = rules.is_some(), "📊 Processando publicações");

        Ok(items.iter().map(|item| transform_publication(item, rules)).collect())
    }

    pub async fn listicles(&self) -> Result<Vec<ListicleRow>, AppError> {
        let items = self.load_publication_items().await?;
        let rows: Vec<ListicleRow> = items.iter().filter_map(transform_listicle).collect();
        tracing::info!(items = items.len(), listicles = rows.len(), "📊 Processando listicles");
        Ok(rows)
    }

    pub async fn television(&self, rules: Option<&[PricingRule]>) -> Result<Vec<TelevisionRow>, AppError> {
        let content = self.read(TELEVISION_FILE).await?;
        let records: Vec<TelevisionRecord> = parse_csv(&content, TELEVISION_FILE)?;
        tracing::info!(items = records.len(), custom_rules = rules.is_some(), "📺 Processando TV");

        Ok(records.iter().map(|record| transform_television(record, rules)).collect())
    }

    pub async fn broadcast_television(
        &self,
        rules: Option<&[PricingRule]>,
    ) -> Result<Vec<BroadcastRow>, AppError> {
        let content = self.read(BROADCAST_FILE).await?;
        let records: Vec<BroadcastRecord> = parse_csv(&content, BROADCAST_FILE)?;
        tracing::info!(items = records.len(), custom_rules = rules.is_some(), "📡 Processando TV aberta");

        Ok(records.iter().map(|record| transform_broadcast(record, rules)).collect())
    }

    async fn load_publication_items(&self) -> Result<Vec<PublicationItem>, AppError> {
        let content = self.read(PUBLICATIONS_FILE).await?;
        parse_publications(&content)
    }

    async fn read(&self, file_name: &str) -> Result<String, AppError> {
        let path = self.data_dir.join(file_name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::DataSource(format!("{}: {}", display(&path), e)))
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Converte o texto de preço da planilha ("$1,250", " 300 ") em número.
/// Texto vazio ou não numérico = sem preço.
pub fn parse_raw_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.trim().parse::<f64>().ok()
}

/// Valor numérico de um preço do data.json. Número passa direto, texto passa pelo
/// `parse_raw_price`, o resto (null, objeto, booleano) é preço em branco.
pub fn raw_price_amount(raw: &RawPrice) -> Option<f64> {
    match raw {
        RawPrice::Number(value) => Some(*value),
        RawPrice::Text(text) => parse_raw_price(text),
        RawPrice::Other(_) => None,
    }
}

/// Preço exibido de uma linha: `None` se o texto não for um preço válido.
pub fn display_price(raw: &str, rules: Option<&[PricingRule]>) -> Option<f64> {
    if raw.trim().is_empty() {
        return None;
    }
    let amount = parse_raw_price(raw);
    if amount.is_none() {
        tracing::debug!(raw, "⚠️ Preço não numérico");
    }
    price_for_amount(amount, rules)
}

fn price_for_amount(amount: Option<f64>, rules: Option<&[PricingRule]>) -> Option<f64> {
    calculate_with(amount?, rules, &TracingObserver)
}

pub fn parse_publications(content: &str) -> Result<Vec<PublicationItem>, AppError> {
    let file: PublicationFile = serde_json::from_str(content)
        .map_err(|e| AppError::DataSource(format!("{}: {}", PUBLICATIONS_FILE, e)))?;

    if !file.result.is_array() {
        return Err(AppError::InvalidDataFormat("'result' não é uma lista".into()));
    }

    serde_json::from_value(file.result)
        .map_err(|e| AppError::DataSource(format!("{}: {}", PUBLICATIONS_FILE, e)))
}

pub fn parse_csv<T: DeserializeOwned>(content: &str, source: &str) -> Result<Vec<T>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // linha curta da planilha: campos faltantes ficam vazios
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (line_num, result) in reader.deserialize().enumerate() {
        let record: T = result.map_err(|e| {
            AppError::DataSource(format!("{}: erro na linha {}: {}", source, line_num + 2, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

fn join_names(names: &Option<Vec<NamedRef>>) -> String {
    names
        .as_ref()
        .map(|list| list.iter().map(|n| n.name.as_str()).collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}

pub fn transform_publication(item: &PublicationItem, rules: Option<&[PricingRule]>) -> PublicationRow {
    let amount = item
        .default_price
        .as_ref()
        .and_then(|prices| prices.first())
        .and_then(raw_price_amount);

    PublicationRow {
        name: item.name.clone().unwrap_or_default(),
        price: price_for_amount(amount, rules),
        do_follow: item.do_follow,
        estimated_time: item.estimated_time.clone().unwrap_or_default(),
        genres: join_names(&item.genres),
        regions: join_names(&item.regions),
        url: item.url.clone().unwrap_or_default(),
        example: item
            .article_preview
            .as_ref()
            .and_then(|p| p.asset.as_ref())
            .map(|a| a.reference.clone())
            .unwrap_or_default(),
        logo: item
            .logo
            .as_ref()
            .and_then(|l| l.asset.as_ref())
            .map(|a| a.reference.clone())
            .unwrap_or_default(),
    }
}

// Listicles têm preço fechado por pacote: sem acréscimo
pub fn transform_listicle(item: &PublicationItem) -> Option<ListicleRow> {
    let options = item.listicles.as_ref().filter(|l| !l.is_empty())?;

    let price = options
        .iter()
        .map(|option| format!("{}: {}", option.name, format_listicle_price(&option.price)))
        .collect::<Vec<_>>()
        .join(", ");

    Some(ListicleRow {
        name: item.name.clone().unwrap_or_default(),
        price,
        do_follow: item.do_follow,
        estimated_time: item.estimated_time.clone().unwrap_or_default(),
        genres: join_names(&item.genres),
        regions: join_names(&item.regions),
        url: item.url.clone().unwrap_or_default(),
        logo: item
            .logo
            .as_ref()
            .and_then(|l| l.asset.as_ref())
            .map(|a| a.reference.clone())
            .unwrap_or_default(),
    })
}

pub fn transform_television(record: &TelevisionRecord, rules: Option<&[PricingRule]>) -> TelevisionRow {
    TelevisionRow {
        name: record.program_name.clone(),
        affiliate: record.affiliate.clone(),
        state: record.state.clone(),
        call: record.calls.clone(),
        market: record.market.clone(),
        location: record.location.clone(),
        time: record.time.clone(),
        price: display_price(&record.rate, rules),
    }
}

pub fn transform_broadcast(record: &BroadcastRecord, rules: Option<&[PricingRule]>) -> BroadcastRow {
    BroadcastRow {
        call_sign: record.call_sign.clone(),
        station: record.station.clone(),
        rate: display_price(&record.rate, rules),
        tat: record.tat.clone(),
        sponsored: record.sponsored.clone(),
        indexed: record.indexed.clone(),
        segment_length: record.segment_length.clone(),
        location: record.location.clone(),
        program_name: record.program_name.clone(),
        interview_type: record.interview_type.clone(),
        example: record.example.clone(),
    }
}

fn format_listicle_price(raw: &RawPrice) -> String {
    match (raw_price_amount(raw), raw) {
        (Some(amount), _) => format_thousands(amount),
        (None, RawPrice::Text(text)) => text.trim().to_string(),
        (None, _) => String::new(),
    }
}

/// 3000 -> "3,000"; 1234.5 -> "1,234.5" (até 3 casas decimais)
pub fn format_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let formatted = format!("{:.3}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pricing::AdditionType;

    const PUBLICATIONS: &str = r#"{
        "result": [
            {
                "name": "Daily Herald",
                "defaultPrice": ["250"],
                "do_follow": true,
                "estimated_time": "1 Week",
                "genres": [{"name": "News"}, {"name": "Business"}],
                "regions": [{"name": "United States"}],
                "url": "https://herald.example",
                "articlePreview": {"asset": {"_ref": "image-abc"}},
                "logo": {"asset": {"_ref": "image-logo"}},
                "listicles": [{"name": "Top 5", "price": 3000}, {"name": "Top 10", "price": 6000}]
            },
            { "name": "No Price Weekly", "defaultPrice": ["n/a"] },
            { "name": "Bare" }
        ]
    }"#;

    #[test]
    fn parses_raw_prices() {
        assert_eq!(parse_raw_price("$1,250"), Some(1250.0));
        assert_eq!(parse_raw_price(" 300 "), Some(300.0));
        assert_eq!(parse_raw_price("$ 99.5"), Some(99.5));
        assert_eq!(parse_raw_price(""), None);
        assert_eq!(parse_raw_price("n/a"), None);
        assert_eq!(parse_raw_price("$"), None);
    }

    #[test]
    fn zero_or_garbage_rates_display_blank() {
        assert_eq!(display_price("0", None), None);
        assert_eq!(display_price("$-5", None), None);
        assert_eq!(display_price("call us", None), None);
        assert_eq!(display_price("$600", None), Some(800.0));
    }

    #[test]
    fn transforms_publications_with_and_without_rules() {
        let items = parse_publications(PUBLICATIONS).unwrap();
        assert_eq!(items.len(), 3);

        let default_row = transform_publication(&items[0], None);
        assert_eq!(default_row.name, "Daily Herald");
        assert_eq!(default_row.price, Some(400.0));
        assert_eq!(default_row.genres, "News, Business");
        assert_eq!(default_row.regions, "United States");
        assert_eq!(default_row.example, "image-abc");
        assert_eq!(default_row.logo, "image-logo");
        assert_eq!(default_row.do_follow, Some(true));

        let rules = [PricingRule {
            min_price: 0.0,
            max_price: Some(500.0),
            addition_type: AdditionType::Fixed,
            addition_value: 100.0,
        }];
        assert_eq!(transform_publication(&items[0], Some(&rules)).price, Some(350.0));

        let blank = transform_publication(&items[1], Some(&rules));
        assert_eq!(blank.price, None);

        let bare = transform_publication(&items[2], None);
        assert_eq!(bare.price, None);
        assert_eq!(bare.genres, "");
        assert_eq!(bare.url, "");
    }

    #[test]
    fn blank_price_serializes_as_empty_string() {
        let items = parse_publications(PUBLICATIONS).unwrap();
        let row = serde_json::to_value(transform_publication(&items[1], None)).unwrap();
        assert_eq!(row["price"], "");

        let priced = serde_json::to_value(transform_publication(&items[0], None)).unwrap();
        assert_eq!(priced["price"], 400.0);
    }

    #[test]
    fn result_must_be_a_list() {
        let err = parse_publications(r#"{"result": {"name": "x"}}"#).unwrap_err();
        assert!(matches!(err, AppError::InvalidDataFormat(_)));
    }

    #[test]
    fn listicles_only_for_items_with_options() {
        let items = parse_publications(PUBLICATIONS).unwrap();
        let rows: Vec<ListicleRow> = items.iter().filter_map(transform_listicle).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, "Top 5: 3,000, Top 10: 6,000");
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_thousands(3000.0), "3,000");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1_234_567.0), "1,234,567");
        assert_eq!(format_thousands(1234.5), "1,234.5");
    }

    #[test]
    fn transforms_television_csv() {
        let csv = "Program Name,Affiliate,State,Calls,Market,Location,Time,Rate\n\
                   Morning Show,ABC,TX,KXAS,Dallas,Studio,7am,\"$1,000\"\n\
                   Late Talk,NBC,CA,KNBC,LA,Studio,11pm,\n";
        let records: Vec<TelevisionRecord> = parse_csv(csv, "data1.csv").unwrap();
        let rows: Vec<TelevisionRow> = records.iter().map(|r| transform_television(r, None)).collect();

        assert_eq!(rows[0].name, "Morning Show");
        assert_eq!(rows[0].call, "KXAS");
        // 1000 + 350 = 1350
        assert_eq!(rows[0].price, Some(1350.0));
        assert_eq!(rows[1].price, None);
    }

    #[test]
    fn transforms_broadcast_csv() {
        let csv = "Call Sign,Station,Rate,TAT,Sponsored,Indexed,Segement Length,Location,Program Name,Interview Type,Example\n\
                   WXYZ,Channel 7,$250,2 weeks,Yes,No,5 min,Detroit,Good Morning,Live,https://clip\n";
        let records: Vec<BroadcastRecord> = parse_csv(csv, "data2.csv").unwrap();
        let row = transform_broadcast(&records[0], Some(&[]));

        assert_eq!(row.call_sign, "WXYZ");
        assert_eq!(row.segment_length, "5 min");
        assert_eq!(row.rate, Some(400.0));
    }

    #[tokio::test]
    async fn missing_data_file_is_a_data_source_error() {
        let service = ListingService::new("/nonexistent/listings");
        let err = service.television(None).await.unwrap_err();
        assert!(matches!(err, AppError::DataSource(_)));
    }

    #[test]
    fn numeric_and_odd_default_prices_do_not_break_the_file() {
        let content = r#"{"result": [
            {"name": "Texto", "defaultPrice": ["250"]},
            {"name": "Número", "defaultPrice": [300]},
            {"name": "Nulo", "defaultPrice": [null]},
            {"name": "Objeto", "defaultPrice": [{"amount": 5}]}
        ]}"#;
        let items = parse_publications(content).unwrap();
        let prices: Vec<Option<f64>> = items.iter().map(|i| transform_publication(i, None).price).collect();

        // 250 + 150 = 400; 300 + 150 = 450
        assert_eq!(prices, vec![Some(400.0), Some(450.0), None, None]);
    }

    #[test]
    fn listicle_prices_accept_text() {
        let content = r#"{"result": [
            {"name": "Elite", "listicles": [{"name": "Top 5", "price": "$3,000"}, {"name": "Top 10", "price": "sob consulta"}]}
        ]}"#;
        let items = parse_publications(content).unwrap();
        let row = transform_listicle(&items[0]).unwrap();
        assert_eq!(row.price, "Top 5: 3,000, Top 10: sob consulta");
    }

    #[test]
    fn rows_use_the_frontend_keys() {
        let items = parse_publications(PUBLICATIONS).unwrap();

        let publication = serde_json::to_value(transform_publication(&items[0], None)).unwrap();
        assert_eq!(publication["do_follow"], true);
        assert_eq!(publication["estimated_time"], "1 Week");
        assert!(publication.get("doFollow").is_none());

        let bare = serde_json::to_value(transform_publication(&items[2], None)).unwrap();
        assert_eq!(bare["do_follow"], "");

        let listicle = serde_json::to_value(transform_listicle(&items[0]).unwrap()).unwrap();
        assert_eq!(listicle["do_follow"], true);
        assert_eq!(listicle["estimated_time"], "1 Week");

        let tv = TelevisionRecord { program_name: "Morning".into(), affiliate: "ABC".into(), state: "TX".into(), rate: "100".into(), ..Default::default() };
        let tv = serde_json::to_value(transform_television(&tv, None)).unwrap();
        for key in ["name", "Affiliate", "State", "call", "market", "location", "time", "price"] {
            assert!(tv.get(key).is_some(), "chave ausente: {}", key);
        }

        let broadcast = serde_json::to_value(transform_broadcast(&BroadcastRecord::default(), None)).unwrap();
        for key in [
            "CallSign", "station", "rate", "tat", "sponsored", "indexed", "SegmentLength", "location",
            "ProgramName", "InterviewType", "Example",
        ] {
            assert!(broadcast.get(key).is_some(), "chave ausente: {}", key);
        }
        assert_eq!(broadcast["rate"], "");
    }

    #[test]
    fn short_csv_rows_are_kept_with_blank_fields() {
        let csv = "Program Name,Affiliate,State,Calls,Market,Location,Time,Rate\n\
                   Morning Show,ABC,TX,KXAS,Dallas,Studio,7am,$600\n\
                   Late Talk,NBC\n";
        let records: Vec<TelevisionRecord> = parse_csv(csv, "data1.csv").unwrap();
        let rows: Vec<TelevisionRow> = records.iter().map(|r| transform_television(r, None)).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, Some(800.0));
        assert_eq!(rows[1].name, "Late Talk");
        assert_eq!(rows[1].affiliate, "NBC");
        assert_eq!(rows[1].state, "");
        assert_eq!(rows[1].price, None);
    }

    #[test]
    fn overflowing_prices_display_blank() {
        assert_eq!(display_price("1.5e308", None), None);
    }
}

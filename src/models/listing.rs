// src/models/listing.rs

use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

// Preço ausente vira "" na resposta (a tela mostra vazio, não zero)
pub fn serialize_display_price<S>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match price {
        Some(value) => serializer.serialize_f64(*value),
        None => serializer.serialize_str(""),
    }
}

// do_follow ausente também sai como ""
pub fn serialize_optional_flag<S>(flag: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match flag {
        Some(value) => serializer.serialize_bool(*value),
        None => serializer.serialize_str(""),
    }
}

// ---
// Publicações (data.json)
// ---

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationFile {
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetHolder {
    pub asset: Option<AssetRef>,
}

/// Preço como vem da planilha: texto ("$1,250"), número, ou qualquer outra coisa
/// (que vira preço em branco, sem invalidar o arquivo inteiro).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListicleOption {
    pub name: String,
    pub price: RawPrice,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationItem {
    pub name: Option<String>,
    pub default_price: Option<Vec<RawPrice>>,
    #[serde(rename = "do_follow")]
    pub do_follow: Option<bool>,
    #[serde(rename = "estimated_time")]
    pub estimated_time: Option<String>,
    pub genres: Option<Vec<NamedRef>>,
    pub regions: Option<Vec<NamedRef>>,
    pub url: Option<String>,
    pub article_preview: Option<AssetHolder>,
    pub logo: Option<AssetHolder>,
    pub listicles: Option<Vec<ListicleOption>>,
}

// Chaves de saída em snake_case, como o front-end lê
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicationRow {
    #[schema(example = "Daily Herald")]
    pub name: String,

    #[serde(serialize_with = "serialize_display_price")]
    #[schema(value_type = f64, example = 650.0)]
    pub price: Option<f64>,

    /// "" quando a fonte não informa
    #[serde(serialize_with = "serialize_optional_flag")]
    #[schema(value_type = bool)]
    pub do_follow: Option<bool>,

    #[schema(example = "1-2 Weeks")]
    pub estimated_time: String,

    #[schema(example = "News, Business")]
    pub genres: String,

    #[schema(example = "United States")]
    pub regions: String,

    pub url: String,
    pub example: String,
    pub logo: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListicleRow {
    pub name: String,

    #[schema(example = "Top 5: 3,000, Top 10: 6,000")]
    pub price: String,

    #[serde(serialize_with = "serialize_optional_flag")]
    #[schema(value_type = bool)]
    pub do_follow: Option<bool>,

    pub estimated_time: String,
    pub genres: String,
    pub regions: String,
    pub url: String,
    pub logo: String,
}

// ---
// TV (data1.csv)
// ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelevisionRecord {
    #[serde(rename = "Program Name", default)]
    pub program_name: String,
    #[serde(rename = "Affiliate", default)]
    pub affiliate: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Calls", default)]
    pub calls: String,
    #[serde(rename = "Market", default)]
    pub market: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "Rate", default)]
    pub rate: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TelevisionRow {
    pub name: String,
    #[serde(rename = "Affiliate")]
    pub affiliate: String,
    #[serde(rename = "State")]
    pub state: String,
    pub call: String,
    pub market: String,
    pub location: String,
    pub time: String,

    #[serde(serialize_with = "serialize_display_price")]
    #[schema(value_type = f64, example = 1350.0)]
    pub price: Option<f64>,
}

// ---
// TV aberta / entrevistas (data2.csv)
// ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastRecord {
    #[serde(rename = "Call Sign", default)]
    pub call_sign: String,
    #[serde(rename = "Station", default)]
    pub station: String,
    #[serde(rename = "Rate", default)]
    pub rate: String,
    #[serde(rename = "TAT", default)]
    pub tat: String,
    #[serde(rename = "Sponsored", default)]
    pub sponsored: String,
    #[serde(rename = "Indexed", default)]
    pub indexed: String,
    // Sim, o cabeçalho da planilha tem esse erro de digitação
    #[serde(rename = "Segement Length", default)]
    pub segment_length: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "Program Name", default)]
    pub program_name: String,
    #[serde(rename = "Interview Type", default)]
    pub interview_type: String,
    #[serde(rename = "Example", default)]
    pub example: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BroadcastRow {
    #[serde(rename = "CallSign")]
    pub call_sign: String,
    pub station: String,

    #[serde(serialize_with = "serialize_display_price")]
    #[schema(value_type = f64, example = 800.0)]
    pub rate: Option<f64>,

    pub tat: String,
    pub sponsored: String,
    pub indexed: String,
    #[serde(rename = "SegmentLength")]
    pub segment_length: String,
    pub location: String,
    #[serde(rename = "ProgramName")]
    pub program_name: String,
    #[serde(rename = "InterviewType")]
    pub interview_type: String,
    #[serde(rename = "Example")]
    pub example: String,
}

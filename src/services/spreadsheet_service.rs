// src/services/spreadsheet_service.rs

//! Planilha do inventário (CSV): leitura para importação em lote e
//! escrita para exportação com as colunas de valoração.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{ConservationUnit, InventoryRecordInput, InventoryRow},
};

pub const IMPORT_COLUMNS: [&str; 11] = [
    "numero_orden",
    "codigo",
    "asunto",
    "fecha_inicial",
    "fecha_final",
    "unidad_conservacion",
    "caja",
    "carpeta",
    "folios",
    "dependencia_id",
    "notas",
];

const REQUIRED_COLUMNS: [&str; 6] = [
    "numero_orden",
    "codigo",
    "asunto",
    "fecha_inicial",
    "fecha_final",
    "unidad_conservacion",
];

// Linha crua: tudo texto, a conversão é feita campo a campo para
// que o erro diga qual coluna está errada.
#[derive(Debug, Deserialize)]
struct CsvInventoryRow {
    numero_orden: String,
    codigo: String,
    asunto: String,
    fecha_inicial: String,
    fecha_final: String,
    unidad_conservacion: String,
    #[serde(default)]
    caja: Option<String>,
    #[serde(default)]
    carpeta: Option<String>,
    #[serde(default)]
    folios: Option<String>,
    #[serde(default)]
    dependencia_id: Option<String>,
    #[serde(default)]
    notas: Option<String>,
}

#[derive(Debug)]
pub struct ParsedRow {
    /// 1 = primeira linha de dados (o cabeçalho não conta)
    pub row: usize,
    pub input: Result<InventoryRecordInput, AppError>,
}

pub fn parse_inventory_csv(bytes: &[u8]) -> Result<Vec<ParsedRow>, AppError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(bytes);

    // O serde casa os nomes exatamente: o cabeçalho é normalizado antes
    let headers: StringRecord = reader
        .headers()
        .map_err(|e| AppError::InvalidImport(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(AppError::InvalidImport(format!("columna '{missing}' ausente")));
    }

    reader.set_headers(headers);

    let rows = reader
        .deserialize::<CsvInventoryRow>()
        .enumerate()
        .map(|(index, result)| ParsedRow {
            row: index + 1,
            input: result
                .map_err(|e| AppError::InvalidImport(e.to_string()))
                .and_then(into_input),
        })
        .collect();

    Ok(rows)
}

fn into_input(raw: CsvInventoryRow) -> Result<InventoryRecordInput, AppError> {
    Ok(InventoryRecordInput {
        order_number: parse_number("numero_orden", &raw.numero_orden)?,
        code: raw.codigo,
        subject: raw.asunto,
        start_date: parse_date("fecha_inicial", &raw.fecha_inicial)?,
        end_date: parse_date("fecha_final", &raw.fecha_final)?,
        conservation_unit: parse_unit(&raw.unidad_conservacion)?,
        box_number: non_empty(raw.caja),
        folder_number: non_empty(raw.carpeta),
        folio_count: match non_empty(raw.folios) {
            Some(value) => parse_number("folios", &value)?,
            None => 0,
        },
        organizational_unit_id: match non_empty(raw.dependencia_id) {
            Some(value) => Some(Uuid::parse_str(&value).map_err(|_| invalid("dependencia_id", &value))?),
            None => None,
        },
        notes: non_empty(raw.notas),
    })
}

fn invalid(column: &str, value: &str) -> AppError {
    AppError::InvalidImport(format!("{column}: '{value}'"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number(column: &str, value: &str) -> Result<i32, AppError> {
    value.trim().parse().map_err(|_| invalid(column, value))
}

/// Aceita ISO (1990-02-28) e o formato local (28/02/1990).
fn parse_date(column: &str, value: &str) -> Result<NaiveDate, AppError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| invalid(column, value))
}

fn parse_unit(value: &str) -> Result<ConservationUnit, AppError> {
    match value.trim().to_uppercase().as_str() {
        "BOX" | "CAJA" => Ok(ConservationUnit::Box),
        "FOLDER" | "CARPETA" => Ok(ConservationUnit::Folder),
        "VOLUME" | "TOMO" | "LIBRO" => Ok(ConservationUnit::Volume),
        "OTHER" | "OTRO" => Ok(ConservationUnit::Other),
        _ => Err(invalid("unidad_conservacion", value)),
    }
}

fn unit_label(unit: ConservationUnit) -> &'static str {
    match unit {
        ConservationUnit::Box => "CAJA",
        ConservationUnit::Folder => "CARPETA",
        ConservationUnit::Volume => "TOMO",
        ConservationUnit::Other => "OTRO",
    }
}

/// Exportação: as colunas da importação + a valoração calculada.
pub fn write_inventory_csv(rows: &[InventoryRow]) -> Result<Vec<u8>, AppError> {
    let mut writer = Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = IMPORT_COLUMNS.to_vec();
    header.extend(["estado", "accion_sugerida", "disposicion_final", "fecha_disposicion"]);
    writer
        .write_record(&header)
        .map_err(|e| anyhow::anyhow!("Falha ao escrever o CSV: {e}"))?;

    for row in rows {
        let record = &row.record;
        let valuation = row.valuation.as_ref();

        writer
            .write_record([
                record.order_number.to_string(),
                record.code.clone(),
                record.subject.clone(),
                record.start_date.to_string(),
                record.end_date.to_string(),
                unit_label(record.conservation_unit).to_string(),
                record.box_number.clone().unwrap_or_default(),
                record.folder_number.clone().unwrap_or_default(),
                record.folio_count.to_string(),
                record.organizational_unit_id.map(|id| id.to_string()).unwrap_or_default(),
                record.notes.clone().unwrap_or_default(),
                valuation.map(|v| v.status.as_str().to_string()).unwrap_or_default(),
                valuation.map(|v| v.suggested_action.clone()).unwrap_or_default(),
                valuation.map(|v| v.final_disposition.code().to_string()).unwrap_or_default(),
                valuation.map(|v| v.final_disposition_date.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| anyhow::anyhow!("Falha ao escrever o CSV: {e}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar o CSV: {e}"))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::{InventoryRecord, RowHighlight, Valuation, ValuationStatus};
    use crate::models::retention::FinalDisposition;
    use chrono::Utc;

    const HEADER: &str =
        "numero_orden,codigo,asunto,fecha_inicial,fecha_final,unidad_conservacion,caja,carpeta,folios,dependencia_id,notas\n";

    #[test]
    fn parses_valid_rows_in_both_date_formats() {
        let csv = format!(
            "{HEADER}1,100.2,Contratos,1985-02-01,1987-11-30,CAJA,1,3,120,,\n\
             2,200,Actas,01/03/1990,31/12/1990,tomo,,,,,Encuadernado\n"
        );

        let rows = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let first = rows[0].input.as_ref().unwrap();
        assert_eq!(first.order_number, 1);
        assert_eq!(first.conservation_unit, ConservationUnit::Box);
        assert_eq!(first.folio_count, 120);
        assert_eq!(first.box_number.as_deref(), Some("1"));
        assert!(first.organizational_unit_id.is_none());

        let second = rows[1].input.as_ref().unwrap();
        assert_eq!(second.start_date, NaiveDate::from_ymd_opt(1990, 3, 1).unwrap());
        assert_eq!(second.conservation_unit, ConservationUnit::Volume);
        assert_eq!(second.folio_count, 0);
        assert_eq!(second.notes.as_deref(), Some("Encuadernado"));
    }

    #[test]
    fn bad_rows_fail_alone_with_their_number() {
        let csv = format!(
            "{HEADER}1,100,Contratos,1985-02-01,1987-11-30,CAJA,,,,,\n\
             x,100,Actas,1985-02-01,1987-11-30,CAJA,,,,,\n\
             3,100,Actas,1985-02-30,1987-11-30,CAJA,,,,,\n\
             4,100,Actas,1985-02-01,1987-11-30,ESTANTE,,,,,\n"
        );

        let rows = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert!(rows[0].input.is_ok());
        assert_eq!(rows[1].row, 2);
        assert!(matches!(&rows[1].input, Err(AppError::InvalidImport(msg)) if msg.starts_with("numero_orden")));
        assert!(matches!(&rows[2].input, Err(AppError::InvalidImport(msg)) if msg.starts_with("fecha_inicial")));
        assert!(matches!(&rows[3].input, Err(AppError::InvalidImport(msg)) if msg.starts_with("unidad_conservacion")));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let csv = "NUMERO_ORDEN,Codigo,ASUNTO,Fecha_Inicial,FECHA_FINAL,Unidad_Conservacion,Folios\n\
                   1,100,Contratos,1985-02-01,1987-11-30,CAJA,12\n";

        let rows = parse_inventory_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);

        let input = rows[0].input.as_ref().unwrap();
        assert_eq!(input.code, "100");
        assert_eq!(input.folio_count, 12);
        assert!(input.box_number.is_none());
    }

    #[test]
    fn missing_required_column_rejects_the_file() {
        let csv = "numero_orden,codigo,asunto\n1,100,Contratos\n";
        assert!(matches!(
            parse_inventory_csv(csv.as_bytes()),
            Err(AppError::InvalidImport(msg)) if msg.contains("fecha_inicial")
        ));
    }

    #[test]
    fn export_writes_valuation_columns() {
        let now = Utc::now();
        let record = InventoryRecord {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            order_number: 7,
            code: "100".into(),
            subject: "Actas, junta directiva".into(),
            start_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(1990, 12, 31).unwrap(),
            conservation_unit: ConservationUnit::Box,
            box_number: Some("4".into()),
            folder_number: None,
            folio_count: 200,
            organizational_unit_id: None,
            historical_period_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let rows = vec![InventoryRow {
            record,
            valuation: Some(Valuation {
                status: ValuationStatus::Fulfilled,
                suggested_action: "Eliminación".into(),
                final_disposition: FinalDisposition::Elimination,
                final_disposition_date: NaiveDate::from_ymd_opt(2000, 12, 31).unwrap(),
            }),
            highlight: Some(RowHighlight::Disposal),
        }];

        let text = String::from_utf8(write_inventory_csv(&rows).unwrap()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().ends_with("estado,accion_sugerida,disposicion_final,fecha_disposicion"));
        assert_eq!(
            lines.next().unwrap(),
            "7,100,\"Actas, junta directiva\",1990-01-01,1990-12-31,CAJA,4,,200,,,fulfilled,Eliminación,E,2000-12-31"
        );
    }
}

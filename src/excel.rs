use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::Local;
use indexmap::IndexMap;
use thiserror::Error;
use umya_spreadsheet::{
    helper::coordinate::string_from_column_index, new_file_empty_worksheet, reader,
    structs::drawing::spreadsheet::MarkerType, writer, Chart, ChartType,
    HorizontalAlignmentValues, Spreadsheet, Style, VerticalAlignmentValues, Worksheet,
};

use crate::models::ItemQuote;

const HEADERS: [&str; 6] = [
    "Item_Link",
    "Item_Name",
    "Buy_Price",
    "Current_Sell_Price",
    "Net_Sell_Price",
    "% Return",
];

const CHARTS_SHEET: &str = "Charts";
const CHART_DATA_SHEET: &str = "ChartData";
const SHEET_NAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const GREEN_FILL: &str = "FFC6EFCE";
const RED_FILL: &str = "FFFFC7CE";

// Chart grid on the Charts sheet, two charts per row.
const CHARTS_PER_ROW: usize = 2;
const CHART_WIDTH_CELLS: u32 = 15;
const CHART_HEIGHT_ROWS: u32 = 29;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("folder {0:?} does not exist, create it first")]
    MissingFolder(PathBuf),
    #[error("failed to read workbook {path:?}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("failed to save workbook {path:?}: {message}")]
    Save { path: PathBuf, message: String },
    #[error("workbook error: {0}")]
    Workbook(String),
}

/// Appends one report sheet for this run and regenerates the chart sheets
/// from the full history, then saves. The workbook on disk is only touched
/// by the final save, so a failure anywhere leaves it as it was.
pub fn write_report(path: &Path, quotes: &[ItemQuote]) -> Result<(), StorageError> {
    let mut book = open_or_create(path)?;

    let timestamp = Local::now().format(SHEET_NAME_FORMAT).to_string();
    let sheet_name = unique_sheet_name(&book, &timestamp);

    append_run_sheet(&mut book, &sheet_name, quotes)?;
    rebuild_charts(&mut book)?;

    writer::xlsx::write(&book, path).map_err(|e| StorageError::Save {
        path: path.to_path_buf(),
        message: format!("{:?}", e),
    })
}

/// Reads the workbook if there is one, otherwise starts an empty book. The
/// parent folder is never created for the user.
fn open_or_create(path: &Path) -> Result<Spreadsheet, StorageError> {
    if path.exists() {
        return reader::xlsx::read(path).map_err(|e| StorageError::Read {
            path: path.to_path_buf(),
            message: format!("{:?}", e),
        });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(StorageError::MissingFolder(parent.to_path_buf()));
        }
    }

    Ok(new_file_empty_worksheet())
}

/// Two runs inside the same second collide on the timestamp name; later
/// ones get a _2, _3, ... suffix.
fn unique_sheet_name(book: &Spreadsheet, base: &str) -> String {
    if book.get_sheet_by_name(base).is_none() {
        return base.to_string();
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{}_{}", base, n);
        if book.get_sheet_by_name(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

fn append_run_sheet(
    book: &mut Spreadsheet,
    sheet_name: &str,
    quotes: &[ItemQuote],
) -> Result<(), StorageError> {
    let sheet = book
        .new_sheet(sheet_name)
        .map_err(|e| StorageError::Workbook(e.to_string()))?;

    for (idx, header) in HEADERS.iter().enumerate() {
        let col = idx as u32 + 1;
        sheet.get_cell_mut((col, 1)).set_value(*header);
        let style = sheet.get_style_mut((col, 1));
        style.get_font_mut().set_bold(true);
        center(style);
    }

    for (i, quote) in quotes.iter().enumerate() {
        let row = i as u32 + 2;

        sheet
            .get_cell_mut((1, row))
            .set_value(quote.item_link.as_str());
        sheet
            .get_cell_mut((2, row))
            .set_value(quote.item_name.as_str());
        sheet
            .get_cell_mut((3, row))
            .set_value_number(round2(quote.buy_price));
        if let Some(sell) = quote.current_sell_price {
            sheet.get_cell_mut((4, row)).set_value_number(round2(sell));
        }
        if let Some(net) = quote.net_sell_price {
            sheet.get_cell_mut((5, row)).set_value_number(round2(net));
        }
        if let Some(ret) = quote.percent_return {
            sheet.get_cell_mut((6, row)).set_value_number(round2(ret));
        }

        for col in 1..=HEADERS.len() as u32 {
            center(sheet.get_style_mut((col, row)));
        }
        if let Some(color) = return_fill(quote.percent_return) {
            sheet.get_style_mut((6, row)).set_background_color(color);
        }
    }

    autosize_columns(sheet, quotes);
    Ok(())
}

fn center(style: &mut Style) {
    let alignment = style.get_alignment_mut();
    alignment.set_horizontal(HorizontalAlignmentValues::Center);
    alignment.set_vertical(VerticalAlignmentValues::Center);
}

/// Positive returns go green, losses go red. Zero and unavailable stay
/// unstyled.
fn return_fill(percent_return: Option<f64>) -> Option<&'static str> {
    match percent_return {
        Some(v) if v > 0.0 => Some(GREEN_FILL),
        Some(v) if v < 0.0 => Some(RED_FILL),
        _ => None,
    }
}

fn autosize_columns(sheet: &mut Worksheet, quotes: &[ItemQuote]) {
    for (idx, header) in HEADERS.iter().enumerate() {
        let mut widest = header.chars().count();
        for quote in quotes {
            widest = widest.max(rendered_cell(quote, idx).chars().count());
        }
        let letter = string_from_column_index(&(idx as u32 + 1));
        sheet
            .get_column_dimension_mut(&letter)
            .set_width(widest as f64 + 2.0);
    }
}

/// The cell text as it ends up in the sheet, for width measuring.
fn rendered_cell(quote: &ItemQuote, column: usize) -> String {
    let number = |value: Option<f64>| value.map(|v| round2(v).to_string()).unwrap_or_default();
    match column {
        0 => quote.item_link.clone(),
        1 => quote.item_name.clone(),
        2 => round2(quote.buy_price).to_string(),
        3 => number(quote.current_sell_price),
        4 => number(quote.net_sell_price),
        _ => number(quote.percent_return),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Net-price history pivoted out of every run sheet in the workbook.
#[derive(Default)]
struct PriceHistory {
    /// Run sheet names in workbook order; only sheets that produced at
    /// least one net price show up as a chart category.
    dates: Vec<String>,
    /// Item name -> buy price from the first sheet the item appears in.
    items: IndexMap<String, Option<f64>>,
    /// (date index, item index) -> net sell price.
    net_prices: HashMap<(usize, usize), f64>,
}

fn collect_history(book: &Spreadsheet) -> PriceHistory {
    let mut history = PriceHistory::default();

    let sheet_names: Vec<String> = book
        .get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect();

    for sheet_name in sheet_names {
        if sheet_name == CHARTS_SHEET || sheet_name == CHART_DATA_SHEET {
            continue;
        }
        let Some(sheet) = book.get_sheet_by_name(&sheet_name) else {
            continue;
        };

        let mut date_index: Option<usize> = None;
        let mut row = 2u32;
        loop {
            let item = sheet.get_value((2, row)).trim().to_string();
            if item.is_empty() {
                break;
            }

            let buy = sheet.get_value((3, row)).trim().parse::<f64>().ok();
            let item_index = match history.items.get_index_of(&item) {
                Some(index) => index,
                None => {
                    history.items.insert(item, buy);
                    history.items.len() - 1
                }
            };

            if let Ok(net) = sheet.get_value((5, row)).trim().parse::<f64>() {
                let date = *date_index.get_or_insert_with(|| {
                    history.dates.push(sheet_name.clone());
                    history.dates.len() - 1
                });
                history.net_prices.insert((date, item_index), net);
            }

            row += 1;
        }
    }

    history
}

/// Drops and regenerates the ChartData and Charts sheets from scratch, so
/// items no longer tracked leave no stale series behind.
fn rebuild_charts(book: &mut Spreadsheet) -> Result<(), StorageError> {
    let _ = book.remove_sheet_by_name(CHARTS_SHEET);
    let _ = book.remove_sheet_by_name(CHART_DATA_SHEET);

    let history = collect_history(book);
    let item_count = history.items.len() as u32;

    let data_sheet = book
        .new_sheet(CHART_DATA_SHEET)
        .map_err(|e| StorageError::Workbook(e.to_string()))?;

    // One net-price column per item, then one flat buy-price column per item.
    data_sheet.get_cell_mut((1, 1)).set_value("Date");
    for (i, (item, _)) in history.items.iter().enumerate() {
        let i = i as u32;
        data_sheet.get_cell_mut((2 + i, 1)).set_value(item.as_str());
        data_sheet
            .get_cell_mut((2 + item_count + i, 1))
            .set_value(format!("{} Buy_Price", item));
    }
    for (d, date) in history.dates.iter().enumerate() {
        let row = d as u32 + 2;
        data_sheet.get_cell_mut((1, row)).set_value(date.as_str());
        for (i, (_, buy)) in history.items.iter().enumerate() {
            if let Some(net) = history.net_prices.get(&(d, i)) {
                data_sheet
                    .get_cell_mut((2 + i as u32, row))
                    .set_value_number(round2(*net));
            }
            if let Some(buy) = buy {
                data_sheet
                    .get_cell_mut((2 + item_count + i as u32, row))
                    .set_value_number(round2(*buy));
            }
        }
    }

    let chart_sheet = book
        .new_sheet(CHARTS_SHEET)
        .map_err(|e| StorageError::Workbook(e.to_string()))?;

    if history.dates.is_empty() {
        return Ok(());
    }

    let last_row = history.dates.len() as u32 + 1;
    for (i, (item, buy)) in history.items.iter().enumerate() {
        let net_col = string_from_column_index(&(i as u32 + 2));
        let mut series = vec![format!(
            "{}!${}$2:${}${}",
            CHART_DATA_SHEET, net_col, net_col, last_row
        )];
        let mut series_titles = vec![item.clone()];
        if buy.is_some() {
            let buy_col = string_from_column_index(&(i as u32 + 2 + item_count));
            series.push(format!(
                "{}!${}$2:${}${}",
                CHART_DATA_SHEET, buy_col, buy_col, last_row
            ));
            series_titles.push(format!("{} Buy_Price", item));
        }

        let anchor_col = (i % CHARTS_PER_ROW) as u32 * CHART_WIDTH_CELLS + 1;
        let anchor_row = (i / CHARTS_PER_ROW) as u32 * CHART_HEIGHT_ROWS + 1;
        let mut from_marker = MarkerType::default();
        from_marker.set_coordinate(format!(
            "{}{}",
            string_from_column_index(&anchor_col),
            anchor_row
        ));
        let mut to_marker = MarkerType::default();
        to_marker.set_coordinate(format!(
            "{}{}",
            string_from_column_index(&(anchor_col + CHART_WIDTH_CELLS - 1)),
            anchor_row + CHART_HEIGHT_ROWS - 1
        ));

        let mut chart = Chart::default();
        chart.new_chart(
            ChartType::LineChart,
            from_marker,
            to_marker,
            series.iter().map(String::as_str).collect(),
        );
        chart.set_title(item.as_str());
        chart.set_horizontal_title("Date");
        chart.set_vertical_title("Net Price (after Steam fee)");
        chart.set_series_title(series_titles);
        chart.set_series_point_title(history.dates.clone());

        chart_sheet.add_chart(chart);
    }

    Ok(())
}

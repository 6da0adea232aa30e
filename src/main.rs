// Entry point and high-level CLI flow.
//
// - Option [1] resolves the CSV through the pipeline, printing diagnostics.
// - Option [2] builds the default view and generates the report files plus
//   a JSON summary.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

use roi_report::cache::LoadCache;
use roi_report::outlier::IqrDetector;
use roi_report::types::{
    FilmRankingRow, MovieRecord, PublisherRankingRow, TierBreakdownRow, TypeBreakdownRow,
    YearTrendRow,
};
use roi_report::{build_view, logging, output, reports, util, Pipeline, ViewFilter};

// Simple in-memory app state so we only run the load stages once but can
// generate reports multiple times in a single run. The pipeline owns an
// injected content-hash cache, so re-loading an unchanged file is cheap.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        pipeline: Pipeline::new().with_cache(LoadCache::new()),
        data: None,
    })
});

struct AppState {
    pipeline: Pipeline,
    data: Option<Vec<MovieRecord>>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the movie financials file through the pipeline.
fn handle_load(path: &str) {
    let mut state = APP_STATE.lock().unwrap();
    match state.pipeline.load_path(path) {
        Ok(result) => {
            println!(
                "Processing dataset... ({} rows read, {} kept)",
                util::format_int(result.report.total_rows as i64),
                util::format_int(result.report.kept_rows as i64)
            );
            if result.report.dropped_empty_title > 0 {
                println!(
                    "Note: {} rows dropped for an empty title.",
                    util::format_int(result.report.dropped_empty_title as i64)
                );
            }
            if result.from_cache {
                println!("Info: served from the load cache (file unchanged).");
            }
            println!();
            state.data = Some(result.records);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: generate all reports and the JSON summary.
///
/// This function is intentionally side-effectful: it writes four report
/// CSVs, the top-films table, a JSON summary, and prints Markdown previews
/// of each to the console.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let detector = IqrDetector::default();
    let view = build_view(&data, &ViewFilter::default(), &detector);

    let ranking = reports::publisher_ranking(&view, reports::DEFAULT_RECENT_WINDOW);
    let r1: Vec<PublisherRankingRow> = ranking.iter().map(Into::into).collect();
    let file1 = "report1_publisher_ranking.csv";
    if let Err(e) = output::write_csv(file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Publisher ROI Ranking");
    println!(
        "(Median ROI over the {} most recent films)\n",
        reports::DEFAULT_RECENT_WINDOW
    );
    output::preview_table_rows(&r1, 4);
    println!("(Full table exported to {})\n", file1);

    let tiers = reports::tier_breakdown(&view);
    let r2: Vec<TierBreakdownRow> = tiers.iter().map(Into::into).collect();
    let file2 = "report2_tier_breakdown.csv";
    if let Err(e) = output::write_csv(file2, &r2) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Budget Tier Breakdown\n");
    output::preview_table_rows(&r2, 4);
    println!("(Full table exported to {})\n", file2);

    let kinds = reports::type_breakdown(&view);
    let r3: Vec<TypeBreakdownRow> = kinds.iter().map(Into::into).collect();
    let file3 = "report3_type_breakdown.csv";
    if let Err(e) = output::write_csv(file3, &r3) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Origin vs Sequel Breakdown\n");
    output::preview_table_rows(&r3, 4);
    println!("(Full table exported to {})\n", file3);

    let years = reports::year_trend(&view);
    let r4: Vec<YearTrendRow> = years.iter().map(Into::into).collect();
    let file4 = "report4_year_trends.csv";
    if let Err(e) = output::write_csv(file4, &r4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Release Year Trends\n");
    output::preview_table_rows(&r4, 4);
    println!("(Full table exported to {})\n", file4);

    let top = reports::top_films_by_roi(&view, 15);
    let top_rows: Vec<FilmRankingRow> = top.iter().map(Into::into).collect();
    let file5 = "top_films.csv";
    if let Err(e) = output::write_csv(file5, &top_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Top 15 Films by ROI\n");
    output::preview_table_rows(&top_rows, 5);
    println!("(Full table exported to {})\n", file5);

    let summary = reports::summary_stats(&view);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!("{}\n", summary.headline());
}

fn main() {
    logging::init_logging();
    let path = std::env::args().nth(1).unwrap_or_else(|| "movies.csv".to_string());
    loop {
        println!("Marvel vs DC ROI Report");
        println!("[1] Load the file ({})", path);
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load(&path);
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}

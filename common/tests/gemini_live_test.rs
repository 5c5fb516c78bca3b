use report_ai_common::gemini::{build_request, interpret_response, request_url};
use report_ai_common::AnalysisConfig;

#[tokio::test]
async fn gemini_report_analysis_live() {
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping live test");
            return;
        }
    };

    let report = "2024年5月20日 市场周报：本周沪深300指数上涨2.1%，成交额连续三日突破万亿。\
                  北向资金净流入120亿元，新能源与半导体板块领涨。";

    let config = AnalysisConfig::default();
    let request = build_request(report, &config);

    let client = reqwest::Client::new();
    let response = client
        .post(request_url(&config, &api_key))
        .json(&request)
        .send()
        .await
        .expect("request failed");

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let result = interpret_response(status, &body).expect("failed to analyze report");
    assert!(!result.title.is_empty());
    assert!(!result.category.is_empty());
    assert!(result.report_date.len() == 10);
}

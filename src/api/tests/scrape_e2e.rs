//! End-to-end tests for race and horse assembly over HTTP.
//!
//! Uses wiremock to stand in for nar.netkeiba.com and db.netkeiba.com.

use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use keiba_scrape::{HttpSource, RaceScraper, RunningStyle, ScrapeError, ScrapeOptions, Surface};

const RACE_PATH: &str = "/race/shutuba.html";
const RACE_ID: &str = "202244111711";

/// Race card listing `horses` as (name, horse id); the first `front_runners`
/// names are shown in the 逃げ row.
fn race_card_html(horses: &[(&str, &str)], front_runners: usize) -> String {
    let entries: String = horses
        .iter()
        .map(|(name, id)| {
            format!(
                r#"<tr><td class="HorseInfo"><div><div><span class="HorseName"><a href="/horse/{id}/">{name}</a></span></div></div></td></tr>"#
            )
        })
        .collect();
    let front: String = horses
        .iter()
        .take(front_runners)
        .map(|(name, _)| format!(r#"<div><span class="UmaName">{name}</span></div>"#))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html><body>
<div id="Netkeiba_Race_Nar_Shutuba"><div class="Wrap fc">
  <div class="RaceColumn01"><div><div class="RaceMainColumn"><div class="RaceList_NameBox"><div class="RaceList_Item02">
    <div class="RaceName">東京記念</div>
    <div class="RaceData01"><span>ダ2400m</span> / 天候:曇</div>
    <div class="RaceData02"><span>15回</span><span>大井</span><span>4日目</span></div>
  </div></div></div></div>
  <table><tbody>{entries}</tbody></table>
  </div>
  <div class="RaceColumn02"><table><tbody>
    <tr><th>逃げ</th><td>{front}</td></tr>
    <tr><th>先行</th><td></td></tr>
    <tr><th>差し</th><td></td></tr>
    <tr><th>追込</th><td></td></tr>
  </tbody></table></div>
</div></div>
</body></html>"#
    )
}

fn result_row(date: &str, race_name: &str, finish: &str, course: &str) -> String {
    let mut cells = vec![String::new(); 18];
    cells[0] = date.to_string();
    cells[4] = race_name.to_string();
    cells[11] = finish.to_string();
    cells[14] = course.to_string();
    cells[15] = "稍".to_string();
    cells[17] = "2:31.4".to_string();
    let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
    format!("<tr>{tds}</tr>")
}

fn horse_html(name: &str, career: &str) -> String {
    let rows = [
        result_row("2023/06/28", "帝王賞", "2", "ダ2000"),
        result_row("2023/05/03", "かしわ記念", "取消", "ダ1600"),
    ]
    .concat();

    format!(
        r#"<!DOCTYPE html>
<html><body>
<div id="db_main_box">
  <div class="db_head fc"><div class="db_head_name fc"><div class="horse_title"><h1>{name}</h1></div></div></div>
  <div class="db_main_deta"><div>
    <div class="db_photo_box"><img src="/img/horse/{name}.jpg"></div>
    <div class="db_prof_area_01"><div class="db_prof_box"><dl><dd><table><tbody>
      <tr><td><img src="/img/db/blue.png"></td></tr>
      <tr><td><img src="/img/db/red.png"></td></tr>
      <tr><td><img src="/img/db/blue.png"></td></tr>
      <tr><td><img src="/img/db/red.png"></td></tr>
      <tr><td><img src="/img/db/red.png"></td></tr>
    </tbody></table></dd></dl></div></div>
    <div class="db_prof_area_02"><table><tbody>
      <tr><th>調教師</th><td>大井所属</td></tr>
      <tr><th>通算成績</th><td>{career}</td></tr>
    </tbody></table></div>
  </div></div>
  <p>この馬は地方競馬の重賞で活躍している競走馬です。父も母も南関東で走りました。</p>
  <p>さいきんはちょうしがよく、まえのレースではしょうりしました。ばんばがおもくなってもちからづよくはしります。</p>
  <table class="blood_table"><tbody>
    <tr><td rowspan="2"><a href="/horse/ped/1/">ゴールドアリュール</a></td><td>サンデーサイレンス</td></tr>
    <tr><td>ニキーヤ</td></tr>
    <tr><td rowspan="2">ミスキャスト</td><td>ノーザンテースト</td></tr>
    <tr><td>ミスデイジー</td></tr>
  </tbody></table>
</div>
<div id="contents"><div class="db_main_race fc"><div><table><tbody>{rows}</tbody></table></div></div></div>
</body></html>"#
    )
}

fn scraper(max_concurrent_fetches: usize) -> RaceScraper {
    let source = HttpSource::new("keiba-scrape-test", Duration::from_secs(5)).unwrap();
    RaceScraper::new(
        Arc::new(source),
        ScrapeOptions {
            max_concurrent_fetches,
            ..Default::default()
        },
    )
}

async fn mount_horse(server: &MockServer, id: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/horse/{id}/")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_e2e_race_with_three_horses() {
    let server = MockServer::start().await;
    let horses = [
        ("ミックファイア", "2020100001"),
        ("ノットゥルノ", "2020100002"),
        ("キリンジ", "2020100003"),
    ];

    Mock::given(method("GET"))
        .and(path(RACE_PATH))
        .and(query_param("race_id", RACE_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(race_card_html(&horses, 2)))
        .expect(1)
        .mount(&server)
        .await;

    // db.netkeiba.com serves EUC-JP
    let horse0_html = horse_html(horses[0].0, "12戦7勝");
    let (euc, _, _) = encoding_rs::EUC_JP.encode(&horse0_html);
    mount_horse(&server, horses[0].1, euc.into_owned()).await;
    mount_horse(&server, horses[1].1, horse_html(horses[1].0, "9戦3勝").into_bytes()).await;
    mount_horse(&server, horses[2].1, horse_html(horses[2].0, "0戦0勝").into_bytes()).await;

    let race_url = format!("{}{}?race_id={}", server.uri(), RACE_PATH, RACE_ID);
    let race = scraper(2).scrape_race(&race_url).await.unwrap();

    assert_eq!(race.name, "東京記念");
    assert_eq!(race.track, "大井");
    assert_eq!(race.surface_type, Surface::Dirt);
    assert_eq!(race.distance_meters, 2400);

    let names: Vec<_> = race.horses.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["ミックファイア", "ノットゥルノ", "キリンジ"]);
    let styles: Vec<_> = race.horses.iter().map(|h| h.running_style).collect();
    assert_eq!(
        styles,
        vec![
            RunningStyle::FrontRunner,
            RunningStyle::FrontRunner,
            RunningStyle::Unknown
        ]
    );

    let first = &race.horses[0];
    assert_eq!((first.starts, first.wins, first.losses), (12, 7, 5));
    assert_eq!(first.pedigree.father, "ゴールドアリュール");
    assert_eq!(first.results.len(), 2);
    assert_eq!(first.results[0].finish_position, 2);
    assert_eq!(first.results[1].finish_position, -1);
    let image_url = first.image_url.as_deref().unwrap_or_default();
    assert!(image_url.starts_with(&format!("{}/img/horse/", server.uri())));

    assert_eq!(race.horses[2].win_percent, None);

    let json = serde_json::to_value(&race).unwrap();
    assert_eq!(json["horses"][0]["runningStyle"], "front_runner");
    assert_eq!(json["horses"][2]["winPercent"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_e2e_race_page_404_fetches_no_horses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RACE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/horse/2020100001/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(horse_html("ミックファイア", "1戦1勝")))
        .expect(0)
        .mount(&server)
        .await;

    let race_url = format!("{}{}?race_id={}", server.uri(), RACE_PATH, RACE_ID);
    let err = scraper(1).scrape_race(&race_url).await.unwrap_err();

    assert!(matches!(err, ScrapeError::HttpStatus { status: 404, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_e2e_horse_failure_aborts_race() {
    let server = MockServer::start().await;
    let horses = [("ミックファイア", "2020100001"), ("ノットゥルノ", "2020100002")];

    Mock::given(method("GET"))
        .and(path(RACE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(race_card_html(&horses, 0)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/horse/2020100001/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_horse(&server, horses[1].1, horse_html(horses[1].0, "9戦3勝").into_bytes()).await;

    let race_url = format!("{}{}?race_id={}", server.uri(), RACE_PATH, RACE_ID);
    let err = scraper(1).scrape_race(&race_url).await.unwrap_err();

    match err {
        ScrapeError::HttpStatus { status, url, .. } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/horse/2020100001/"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_e2e_horse_list_mode() {
    let server = MockServer::start().await;
    let horses = [("ミックファイア", "2020100001"), ("ノットゥルノ", "2020100002")];

    Mock::given(method("GET"))
        .and(path(RACE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(race_card_html(&horses, 2)))
        .mount(&server)
        .await;
    mount_horse(&server, horses[0].1, horse_html(horses[0].0, "12戦7勝").into_bytes()).await;
    mount_horse(&server, horses[1].1, horse_html(horses[1].0, "9戦3勝").into_bytes()).await;

    let list_url = format!("{}{}?race_id={}", server.uri(), RACE_PATH, RACE_ID);
    let horses = scraper(1).scrape_horse_list(&list_url).await.unwrap();

    assert_eq!(horses.len(), 2);
    assert!(horses
        .iter()
        .all(|h| h.running_style == RunningStyle::Unknown));
    assert_eq!(horses[1].course_aptitude, Surface::Turf);
}

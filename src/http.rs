use std::time::Duration;

use reqwest::{Client, Url};
use scraper::Html;

use crate::parse::create_selector;
use crate::session::{Session, SessionFactory};
use crate::{info_time, Error, Result, WAIT_TIMEOUT_MS};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Opens [`HttpSession`]s. Every session gets its own client, so a restart
/// also drops cookies and pooled connections.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for HttpSessionFactory {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_millis(WAIT_TIMEOUT_MS),
        }
    }
}

impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .build()?;
        info_time!("Opened a new HTTP session");
        Ok(HttpSession { client, page: None })
    }
}

/// Drives the filter form with plain requests: the form is read out of the
/// loaded page and submitted the way a browser would submit it.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    page: Option<Page>,
}

#[derive(Debug)]
struct Page {
    url: Url,
    html: String,
}

/// A form ready to be sent.
#[derive(Debug, PartialEq)]
struct Submission {
    method: FormMethod,
    url: Url,
    fields: Vec<(String, String)>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum FormMethod {
    Get,
    Post,
}

impl HttpSession {
    async fn load(&mut self, request: reqwest::RequestBuilder) -> Result<()> {
        let resp = request.send().await?.error_for_status()?;
        let url = resp.url().clone();
        let html = resp.text().await?;
        self.page = Some(Page { url, html });
        Ok(())
    }

    fn current(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::ElementNotFound("no page loaded".to_string()))
    }
}

impl Session for HttpSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let request = self.client.get(url);
        self.load(request).await
    }

    async fn has_element(&mut self, selector: &str) -> Result<bool> {
        let sel = create_selector(selector)?;
        let page = self.current()?;
        let doc = Html::parse_document(&page.html);
        let found = doc.select(&sel).next().is_some();
        Ok(found)
    }

    async fn submit_filter(&mut self, input: &str, button: &str, value: &str) -> Result<()> {
        let page = self.current()?;
        let submission = build_submission(&page.html, &page.url, input, button, value)?;

        let request = match submission.method {
            FormMethod::Get => self
                .client
                .get(submission.url)
                .query(&submission.fields),
            FormMethod::Post => self
                .client
                .post(submission.url)
                .form(&submission.fields),
        };
        self.load(request).await
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.current()?.html.clone())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Finds the form holding `input`, collects its successful controls with
/// `input` set to `value`, and resolves where and how it is sent.
fn build_submission(
    html: &str,
    page_url: &Url,
    input: &str,
    button: &str,
    value: &str,
) -> Result<Submission> {
    let doc = Html::parse_document(html);
    let form_sel = create_selector("form")?;
    let input_sel = create_selector(input)?;
    let button_sel = create_selector(button)?;
    let field_sel = create_selector("input[name], select[name], textarea[name]")?;
    let option_sel = create_selector("option")?;

    let form = doc
        .select(&form_sel)
        .find(|form| form.select(&input_sel).next().is_some())
        .ok_or_else(|| Error::ElementNotFound(input.to_string()))?;
    let button_el = form
        .select(&button_sel)
        .next()
        .or_else(|| doc.select(&button_sel).next())
        .ok_or_else(|| Error::ElementNotFound(button.to_string()))?;
    let target_name = form
        .select(&input_sel)
        .next()
        .and_then(|el| el.value().attr("name"))
        .ok_or_else(|| Error::ElementNotFound(format!("{input} has no name")))?;

    let mut fields = Vec::new();
    for field in form.select(&field_sel) {
        let el = field.value();
        let Some(name) = el.attr("name") else {
            continue;
        };
        if el.attr("disabled").is_some() {
            continue;
        }

        let field_value = if name == target_name {
            value.to_string()
        } else if el.name() == "textarea" {
            field.text().collect::<String>()
        } else if el.name() == "select" {
            let options = field.select(&option_sel).collect::<Vec<_>>();
            let chosen = options
                .iter()
                .find(|o| o.value().attr("selected").is_some())
                .or_else(|| options.first());
            match chosen {
                Some(o) => o
                    .value()
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| o.text().collect::<String>().trim().to_string()),
                None => continue,
            }
        } else {
            let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
            match kind.as_str() {
                "submit" | "button" | "image" | "reset" | "file" => continue,
                "checkbox" | "radio" if el.attr("checked").is_none() => continue,
                "checkbox" | "radio" => el.attr("value").unwrap_or("on").to_string(),
                _ => el.attr("value").unwrap_or_default().to_string(),
            }
        };
        fields.push((name.to_string(), field_value));
    }

    if let Some(name) = button_el.value().attr("name") {
        let button_value = button_el.value().attr("value").unwrap_or_default();
        fields.push((name.to_string(), button_value.to_string()));
    }

    let form_el = form.value();
    let action = form_el.attr("action").unwrap_or_default();
    let mut url = page_url
        .join(action)
        .map_err(|e| Error::ElementNotFound(format!("form action {action:?}: {e}")))?;

    let method = match form_el.attr("method") {
        Some(m) if m.eq_ignore_ascii_case("post") => FormMethod::Post,
        _ => FormMethod::Get,
    };
    if method == FormMethod::Get {
        url.set_query(None);
    }

    Ok(Submission {
        method,
        url,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const FILTER_PAGE: &str = r#"<html><body>
        <form class="filter" action="/hd_base/zcyc_params/zcyc/" method="get">
            <input type="hidden" name="UniDbQuery.Posted" value="True">
            <input type="text" name="UniDbQuery.To" value="01.01.2024">
            <input type="checkbox" name="UniDbQuery.Extended">
            <select name="UniDbQuery.Mode"><option value="d">day</option><option value="m" selected>month</option></select>
            <button class="datepicker-filter_button" type="submit">Show</button>
        </form>
    </body></html>"#;

    fn base() -> Url {
        Url::parse("https://www.cbr.ru/hd_base/zcyc_params/zcyc/?old=1").unwrap()
    }

    #[test]
    fn form_is_filled_with_the_date() {
        let sub = build_submission(
            FILTER_PAGE,
            &base(),
            "input[name='UniDbQuery.To']",
            ".datepicker-filter_button",
            "15.06.2023",
        )
        .unwrap();

        assert_eq!(sub.method, FormMethod::Get);
        assert_eq!(
            sub.url.as_str(),
            "https://www.cbr.ru/hd_base/zcyc_params/zcyc/"
        );
        assert_eq!(
            sub.fields,
            vec![
                ("UniDbQuery.Posted".to_string(), "True".to_string()),
                ("UniDbQuery.To".to_string(), "15.06.2023".to_string()),
                ("UniDbQuery.Mode".to_string(), "m".to_string()),
            ]
        );
    }

    #[test]
    fn post_forms_and_named_buttons() {
        let html = r#"<form method="POST" action="submit">
            <input name="q" value="x">
            <button class="go" name="action" value="filter">Go</button>
        </form>"#;
        let sub = build_submission(html, &base(), "input[name='q']", ".go", "y").unwrap();

        assert_eq!(sub.method, FormMethod::Post);
        assert_eq!(
            sub.url.as_str(),
            "https://www.cbr.ru/hd_base/zcyc_params/zcyc/submit"
        );
        assert_eq!(
            sub.fields,
            vec![
                ("q".to_string(), "y".to_string()),
                ("action".to_string(), "filter".to_string()),
            ]
        );
    }

    #[test]
    fn disabled_controls_are_left_out_and_textareas_sent() {
        let html = r#"<form action="/filter">
            <input name="UniDbQuery.To" value="">
            <input name="UniDbQuery.From" value="01.01.2005" disabled>
            <select name="mode" disabled><option value="d">day</option></select>
            <textarea name="note">two words</textarea>
            <button class="go">Go</button>
        </form>"#;
        let sub = build_submission(html, &base(), "input[name='UniDbQuery.To']", ".go", "02.01.2006")
            .unwrap();

        assert_eq!(
            sub.fields,
            vec![
                ("UniDbQuery.To".to_string(), "02.01.2006".to_string()),
                ("note".to_string(), "two words".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn error_status_is_not_session_death() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                )
                .await;
            let _ = stream.shutdown().await;
        });

        let mut session = HttpSession {
            client: Client::builder().no_proxy().build().unwrap(),
            page: None,
        };
        let err = session
            .goto(&format!("http://127.0.0.1:{port}/zcyc/"))
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(!err.is_session_death(), "{err}");
        assert!(matches!(&err, Error::Http(status) if status.starts_with("503")), "{err}");
        assert!(session.page_source().await.is_err());
    }

    #[test]
    fn missing_controls_are_reported() {
        let no_button = FILTER_PAGE.replace("datepicker-filter_button", "other");
        assert!(matches!(
            build_submission(&no_button, &base(), "input[name='UniDbQuery.To']", ".datepicker-filter_button", "x"),
            Err(Error::ElementNotFound(sel)) if sel == ".datepicker-filter_button"
        ));

        assert!(matches!(
            build_submission("<p>maintenance</p>", &base(), "input[name='UniDbQuery.To']", ".datepicker-filter_button", "x"),
            Err(Error::ElementNotFound(sel)) if sel == "input[name='UniDbQuery.To']"
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_session_death() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut session = HttpSession {
            client: Client::builder().no_proxy().build().unwrap(),
            page: None,
        };
        let err = session
            .goto(&format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap_err();

        assert!(err.is_session_death(), "{err}");
    }

    #[tokio::test]
    async fn queries_before_loading_fail() {
        let mut session = HttpSessionFactory::default().open().await.unwrap();
        assert!(session.has_element("table").await.is_err());
        assert!(session.page_source().await.is_err());
    }
}

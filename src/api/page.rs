//! The single-page form
//!
//! One text input, one button, one status line and, once a fetch succeeds,
//! a link that saves the returned MP3. The script talks to `POST /fetch`
//! with JSON and reads errors from the standard JSON error body. While the
//! request runs it listens on `/events` for the `downloading` event carrying
//! its own query and shows the resolved title.

/// Title shown in the browser tab and page header
pub const PAGE_TITLE: &str = "YT-Fetch";

/// Render the form page
///
/// `direct_markers` lets the status line tell searches from direct links
/// the same way the pipeline does.
pub fn render(direct_markers: &[String]) -> String {
    // A JSON array of strings is also a valid JS array literal
    let markers = serde_json::to_string(direct_markers).unwrap_or_else(|_| "[]".to_string());

    FORM_HTML
        .replace("{{title}}", PAGE_TITLE)
        .replace("{{markers}}", &markers.replace("</", "<\\/"))
}

const FORM_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 36rem; margin: 3rem auto; padding: 0 1rem; color: #222; }
  h1 { margin-bottom: 0.25rem; }
  form { display: flex; gap: 0.5rem; margin: 1.5rem 0 1rem; }
  input[type=text] { flex: 1; padding: 0.6rem; font-size: 1rem; border: 1px solid #bbb; border-radius: 6px; }
  button { padding: 0.6rem 1rem; font-size: 1rem; border: 0; border-radius: 6px; background: #d33; color: #fff; cursor: pointer; }
  button:disabled { background: #999; cursor: wait; }
  #status { min-height: 1.5rem; padding: 0.5rem 0.75rem; border-radius: 6px; }
  #status.info { background: #eef4ff; }
  #status.success { background: #e9f8ee; }
  #status.error { background: #fdecec; }
  #save { display: inline-block; margin-top: 1rem; }
</style>
</head>
<body>
<h1>&#127925; {{title}}</h1>
<p>Paste a link or type a search term to get the MP3.</p>

<form id="fetch-form" method="post" action="fetch">
  <input id="query" name="query" type="text" placeholder="YouTube URL or Search Query" autocomplete="off" autofocus>
  <button id="go" type="submit">Download Audio</button>
</form>

<div id="status" role="status"></div>
<a id="save" hidden>&#11015;&#65039; Click to Save MP3</a>

<script>
(function () {
  const form = document.getElementById("fetch-form");
  const input = document.getElementById("query");
  const button = document.getElementById("go");
  const status = document.getElementById("status");
  const save = document.getElementById("save");
  const markers = {{markers}};

  function show(kind, text) {
    status.className = kind;
    status.textContent = text;
  }

  function fileName(response) {
    const header = response.headers.get("Content-Disposition") || "";
    const extended = /filename\*=UTF-8''([^;]+)/i.exec(header);
    if (extended) return decodeURIComponent(extended[1]);
    const plain = /filename="([^"]+)"/i.exec(header);
    return plain ? plain[1] : "audio.mp3";
  }

  form.addEventListener("submit", async function (event) {
    event.preventDefault();
    const query = input.value.trim();

    if (save.href) URL.revokeObjectURL(save.href);
    save.hidden = true;
    save.removeAttribute("href");

    if (!query) {
      show("error", "Please enter a link or search term.");
      return;
    }

    const isSearch = !markers.some(function (m) { return query.includes(m); });
    show("info", isSearch
      ? "Searching for: '" + query + "'. This may take a few seconds."
      : "Processing... This may take a few seconds.");
    button.disabled = true;

    let done = false;
    const progress = typeof EventSource === "function" ? new EventSource("events") : null;
    if (progress) {
      progress.addEventListener("downloading", function (message) {
        try {
          const data = JSON.parse(message.data);
          if (!done && data.query === query) {
            show("info", "Downloading: " + data.title + "...");
          }
        } catch (_) {}
      });
    }

    try {
      const response = await fetch("fetch", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ query: query }),
      });

      if (!response.ok) {
        let message = response.statusText;
        try {
          const body = await response.json();
          message = body.error.message;
        } catch (_) {}
        show("error", "An error occurred: " + message);
        return;
      }

      const name = fileName(response);
      const blob = await response.blob();
      save.href = URL.createObjectURL(blob);
      save.download = name;
      save.hidden = false;
      show("success", "Conversion Complete! " + name);
    } catch (err) {
      show("error", "An error occurred: " + err);
    } finally {
      done = true;
      if (progress) progress.close();
      button.disabled = false;
    }
  });
})();
</script>
</body>
</html>
"#;

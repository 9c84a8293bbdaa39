//! Embedded single-page UI.

/// The whole front end: task input, attempt slider, progress log and the
/// two result panes. Served as-is from `GET /`.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>codemender</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; background: #f5f7f9; color: #1a1a2e; }
  header { padding: 1rem 2rem; background: #1a1a2e; color: #fff; }
  header h1 { margin: 0; font-size: 1.3rem; }
  main { max-width: 960px; margin: 0 auto; padding: 1.5rem 2rem; }
  label { display: block; margin: 0.8rem 0 0.3rem; font-weight: 600; }
  textarea { width: 100%; min-height: 5rem; font-family: monospace; padding: 0.5rem; box-sizing: border-box; }
  input[type=range] { width: 220px; vertical-align: middle; }
  button { margin-top: 1rem; padding: 0.6rem 2rem; border: 0; border-radius: 5px; background: #ff4b4b; color: #fff; font-size: 1rem; cursor: pointer; }
  button:disabled { background: #aaa; cursor: wait; }
  #progress { margin-top: 1rem; }
  .update { padding: 0.4rem 0.8rem; margin-bottom: 0.4rem; background: #fff; border-left: 4px solid #ff4b4b; border-radius: 4px; font-size: 0.9rem; }
  .panes { display: flex; gap: 1rem; margin-top: 1.5rem; }
  .pane { flex: 1; }
  pre { background: #fff; border: 1px solid #ddd; border-radius: 4px; padding: 0.8rem; min-height: 6rem; overflow: auto; white-space: pre-wrap; }
</style>
</head>
<body>
<header><h1>codemender &mdash; I write, test, and debug code until it works.</h1></header>
<main>
  <label for="task">What should I code?</label>
  <textarea id="task">Get the price of Bitcoin in USD from the CoinGecko API and print it.</textarea>

  <label for="attempts">Max debugging loops: <span id="attempts-value">3</span></label>
  <input type="range" id="attempts" min="1" max="5" value="3">

  <div><button id="start">Start Agent</button></div>

  <div id="progress"></div>

  <div class="panes">
    <div class="pane">
      <h3>Console Output</h3>
      <pre id="output">No output.</pre>
    </div>
    <div class="pane">
      <h3>Generated Code</h3>
      <pre id="code"></pre>
    </div>
  </div>
</main>
<script>
  const attempts = document.getElementById('attempts');
  const attemptsValue = document.getElementById('attempts-value');
  attempts.addEventListener('input', () => { attemptsValue.textContent = attempts.value; });

  const progress = document.getElementById('progress');
  const events = new EventSource('/events');
  events.addEventListener('progress', (e) => {
    const data = JSON.parse(e.data);
    const div = document.createElement('div');
    div.className = 'update';
    if (data.type === 'node_started') {
      div.textContent = `[attempt ${data.attempt}] ${data.stage}: ${data.message}`;
    } else if (data.type === 'node_completed') {
      div.textContent = `[attempt ${data.attempt}] ${data.stage} → ${data.message}`;
    } else if (data.type === 'session_completed') {
      div.textContent = `Session finished: ${data.result.outcome} after ${data.result.iterations} attempt(s)`;
    } else {
      div.textContent = `Session aborted: ${data.error}`;
    }
    progress.appendChild(div);
  });

  const button = document.getElementById('start');
  button.addEventListener('click', async () => {
    button.disabled = true;
    progress.innerHTML = '';
    document.getElementById('output').textContent = '';
    document.getElementById('code').textContent = '';
    try {
      const response = await fetch('/api/run', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
          task: document.getElementById('task').value,
          max_attempts: parseInt(attempts.value, 10),
        }),
      });
      if (!response.ok) {
        document.getElementById('output').textContent = await response.text();
        return;
      }
      const result = await response.json();
      document.getElementById('output').textContent =
        result.output || result.error || 'No output.';
      document.getElementById('code').textContent = result.code;
    } catch (err) {
      document.getElementById('output').textContent = String(err);
    } finally {
      button.disabled = false;
    }
  });
</script>
</body>
</html>
"#;

//! Single-page web UI
//!
//! Text box plus image drop area; images are captioned first and the caption
//! is then analyzed like typed text.

use axum::{response::Html, routing::get, Router};

use crate::AppState;

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sentiment Analyzer</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }

        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            max-width: 800px;
            width: 100%;
            padding: 40px;
        }

        h1 { color: #333; margin-bottom: 10px; font-size: 2em; }
        .subtitle { color: #666; margin-bottom: 30px; font-size: 0.9em; }

        textarea {
            width: 100%;
            min-height: 140px;
            border: 2px solid #e0e0ff;
            border-radius: 12px;
            padding: 14px;
            font: inherit;
            resize: vertical;
        }

        button {
            margin-top: 15px;
            background: #667eea;
            color: white;
            border: none;
            border-radius: 10px;
            padding: 12px 24px;
            font-weight: 600;
            cursor: pointer;
        }

        button:disabled { opacity: 0.6; cursor: wait; }

        .upload-area {
            margin-top: 25px;
            border: 3px dashed #667eea;
            border-radius: 15px;
            padding: 30px 20px;
            text-align: center;
            cursor: pointer;
            background: #f8f9ff;
            color: #667eea;
        }

        .upload-area.dragover { border-color: #764ba2; background: #e8ebff; }
        input[type="file"] { display: none; }

        .result { background: #f8f9ff; border-radius: 10px; padding: 20px; margin-top: 25px; display: none; }
        .result-label { color: #667eea; font-weight: 600; font-size: 0.9em; text-transform: uppercase; letter-spacing: 1px; }
        .result-text { color: #333; font-size: 1.1em; line-height: 1.6; margin-top: 8px; }
        .positive { color: #1a9c5b; }
        .negative { color: #d64545; }
        .neutral { color: #777; }
        .error { color: #d64545; margin-top: 15px; display: none; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Sentiment Analyzer</h1>
        <p class="subtitle">Type some text or drop an image to classify its sentiment.</p>

        <textarea id="text" placeholder="Enter text to analyze (Ctrl+Enter to submit)"></textarea>
        <button id="analyze">Analyze</button>

        <div class="upload-area" id="uploadArea">Drop an image here or click to choose one</div>
        <input type="file" id="fileInput" accept="image/*">

        <div class="error" id="error"></div>

        <div class="result" id="result">
            <div class="result-label">Sentiment</div>
            <div class="result-text"><strong id="label"></strong> &middot; <span id="confidence"></span></div>
            <div class="result-text" id="explanation"></div>
        </div>
    </div>

    <script>
        const textBox = document.getElementById('text');
        const analyzeButton = document.getElementById('analyze');
        const uploadArea = document.getElementById('uploadArea');
        const fileInput = document.getElementById('fileInput');
        const errorDiv = document.getElementById('error');
        const resultDiv = document.getElementById('result');

        function showError(message) {
            errorDiv.textContent = message;
            errorDiv.style.display = 'block';
        }

        async function postJson(url, body) {
            const response = await fetch(url, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(body)
            });
            const data = await response.json();
            if (data.error) {
                throw new Error(data.error);
            }
            return data;
        }

        async function analyze() {
            errorDiv.style.display = 'none';
            analyzeButton.disabled = true;
            try {
                const result = await postJson('/api/analyze-sentiment', { text: textBox.value });
                const label = document.getElementById('label');
                label.textContent = result.sentiment;
                label.className = result.sentiment;
                document.getElementById('confidence').textContent = Math.round(result.confidence * 100) + '%';
                document.getElementById('explanation').textContent = result.explanation;
                resultDiv.style.display = 'block';
            } catch (error) {
                showError('Error: ' + error.message);
            } finally {
                analyzeButton.disabled = false;
            }
        }

        function handleFile(file) {
            const reader = new FileReader();
            reader.onload = async (e) => {
                errorDiv.style.display = 'none';
                try {
                    const data = await postJson('/api/analyze-image', { imageBase64: e.target.result });
                    textBox.value = data.extractedText;
                    await analyze();
                } catch (error) {
                    showError('Error: ' + error.message);
                }
            };
            reader.readAsDataURL(file);
        }

        analyzeButton.addEventListener('click', analyze);
        textBox.addEventListener('keydown', (e) => {
            if (e.key === 'Enter' && (e.metaKey || e.ctrlKey)) {
                e.preventDefault();
                analyze();
            }
        });

        uploadArea.addEventListener('click', () => fileInput.click());
        uploadArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });
        uploadArea.addEventListener('dragleave', () => uploadArea.classList.remove('dragover'));
        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            const file = e.dataTransfer.files[0];
            if (file && file.type.startsWith('image/')) {
                handleFile(file);
            }
        });
        fileInput.addEventListener('change', (e) => {
            if (e.target.files[0]) {
                handleFile(e.target.files[0]);
            }
        });
    </script>
</body>
</html>
"#;

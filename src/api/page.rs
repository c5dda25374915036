//! Single-page upload form served at `/`

/// Browser-side counterpart of [`crate::upload::UploadForm`]: same limits,
/// same messages, one request per submit and no submit while one is pending.
pub const UPLOAD_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Grocery Items Identifier</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
        .container { max-width: 600px; margin: auto; padding: 20px; }
        .error { color: red; }
        .result { white-space: pre-wrap; margin-top: 20px; }
        button { margin-top: 10px; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Grocery Items Identifier</h1>
        <form id="uploadForm">
            <input type="file" id="fileInput" accept="image/png, image/jpeg, image/webp, image/gif" multiple>
            <p class="error" id="error" hidden></p>
            <button type="submit" id="submitButton">Submit</button>
        </form>
        <div class="result" id="resultBox" hidden>
            <h2>Result:</h2>
            <pre id="result"></pre>
        </div>
    </div>

    <script>
        const MAX_IMAGES = 4;
        const state = { images: [], loading: false, error: "", result: "" };

        const fileInput = document.getElementById('fileInput');
        const form = document.getElementById('uploadForm');
        const errorBox = document.getElementById('error');
        const submitButton = document.getElementById('submitButton');
        const resultBox = document.getElementById('resultBox');
        const resultText = document.getElementById('result');

        function render() {
            errorBox.textContent = state.error;
            errorBox.hidden = !state.error;
            submitButton.disabled = state.loading;
            submitButton.textContent = state.loading ? 'Processing...' : 'Submit';
            resultText.textContent = state.result;
            resultBox.hidden = !state.result;
        }

        function readImage(file) {
            return new Promise((resolve, reject) => {
                const reader = new FileReader();
                reader.onload = () => {
                    if (typeof reader.result !== 'string') {
                        reject(new Error('Failed to read file'));
                        return;
                    }
                    const url = reader.result;
                    const match = url.match(/^data:(.*);base64,/);
                    resolve({ base64: url.split(',')[1], type: match ? match[1] : file.type });
                };
                reader.onerror = () => reject(reader.error);
                reader.readAsDataURL(file);
            });
        }

        fileInput.addEventListener('change', async (e) => {
            state.error = '';
            const files = e.target.files;
            if (!files) { render(); return; }
            if (files.length > MAX_IMAGES) {
                state.error = 'You can upload up to 4 images.';
                render();
                return;
            }
            try {
                state.images = await Promise.all(Array.from(files).map(readImage));
            } catch (err) {
                console.error(err);
                state.error = 'Error reading files.';
            }
            render();
        });

        form.addEventListener('submit', async (e) => {
            e.preventDefault();
            state.error = '';
            if (state.images.length === 0) {
                state.error = 'Please select at least one image.';
                render();
                return;
            }
            if (state.loading) {
                state.error = 'A submission is already in progress.';
                render();
                return;
            }
            state.loading = true;
            state.result = '';
            render();
            try {
                const res = await fetch('/api/identify', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ images: state.images }),
                });
                if (!res.ok) {
                    let message = 'Something went wrong';
                    try {
                        const body = await res.json();
                        if (body && body.error) message = body.error;
                    } catch (_) {}
                    throw new Error(message);
                }
                state.result = JSON.stringify(await res.json(), null, 2);
            } catch (err) {
                console.error(err);
                state.error = (err && err.message) || 'Error occurred';
            } finally {
                state.loading = false;
                render();
            }
        });

        render();
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_posts_to_identify_endpoint() {
        assert!(UPLOAD_PAGE.contains("fetch('/api/identify'"));
        assert!(UPLOAD_PAGE.contains("accept=\"image/png, image/jpeg, image/webp, image/gif\""));
        assert!(UPLOAD_PAGE.contains("const MAX_IMAGES = 4;"));
    }
}

//! Home Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"AI Interior Design"</h1>
                <p class="tagline">"Free, no sign up, no credit card"</p>
                <div class="cta">
                    <a href="/pricing" class="btn btn-primary">"View Plans"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"📷 Snap a room"</h3>
                    <p>"Upload a photo and get an instant analysis of layout, light and color."</p>
                </div>
                <div class="feature">
                    <h3>"🎨 Get a plan"</h3>
                    <p>"Design recommendations tailored to the space you already have."</p>
                </div>
                <div class="feature">
                    <h3>"📄 Take it with you"</h3>
                    <p>"Download reports to share with family or contractors."</p>
                </div>
            </section>
        </div>
    }
}

//! 分类筛选

use leptos::prelude::*;

#[component]
pub fn CategoryBar(categories: Memo<Vec<String>>, active: RwSignal<String>) -> impl IntoView {
    view! {
        <nav class="category-bar">
            <For
                each=move || categories.get()
                key=|category| category.clone()
                children=move |category| {
                    let is_active = {
                        let category = category.clone();
                        move || active.get() == category
                    };
                    let value = category.clone();
                    view! {
                        <button
                            class=move || if is_active() { "category-chip active" } else { "category-chip" }
                            on:click=move |_| active.set(value.clone())
                        >
                            {category}
                        </button>
                    }
                }
            />
        </nav>
    }
}

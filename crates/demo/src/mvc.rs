//! One model field, two views.
use ltk_widgets::prelude::*;

ltk::model! {
    pub struct Greeting {
        name: String = "World",
        shouts: i64 = 0,
    }
}

pub fn run() -> anyhow::Result<()> {
    let greeting = Greeting::new();
    let input = Input::new(greeting.name());
    let text = Text::new(greeting.name());
    let shout = Button::new("Shout", {
        let greeting = greeting.clone();
        move |_| {
            let name = greeting.name().to_string().to_uppercase();
            greeting.set_name(name);
            if let Err(err) = greeting.shouts().apply(ltk::BinaryOp::Add, 1) {
                log::error!("could not count the shout: {err}");
            }
        }
    });
    let shouts = Label::new(greeting.shouts());
    let view = VBox::new()
        .attr("id", "mvc")
        .add(HBox::new().add(Text::new("Name:")).add(input.clone()))
        .add(HBox::new().add(Text::new("Hello,")).add(text))
        .add(HBox::new().add(shout.clone()).add(shouts));

    crate::show("initial", &view.html_string());

    input.type_text("ltk");
    crate::show("after typing", &view.html_string());

    shout.click();
    crate::show("after shouting", &view.html_string());

    greeting.set_name("again");
    crate::show("after a model write", &view.html_string());
    println!("{greeting}");
    Ok(())
}

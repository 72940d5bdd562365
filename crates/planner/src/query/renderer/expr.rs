use crate::query::{
    ast::expr::{Expr, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

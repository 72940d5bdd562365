use crate::query::{
    ast::insert::{ConflictAction, Insert, OnConflict},
    renderer::Render,
};

impl Render for Insert {
    fn render(&self, r: &mut super::Renderer) {
        // 1. INSERT INTO table (...)
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        let quoted_columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| r.dialect.quote_identifier(c))
            .collect();
        r.sql.push_str(&quoted_columns.join(", "));
        r.sql.push(')');

        // 2. VALUES (...), (...)
        render_values(self, r);

        // 3. ON CONFLICT
        if let Some(on_conflict) = &self.on_conflict {
            render_on_conflict(on_conflict, r);
        }
    }
}

fn render_values(insert: &Insert, r: &mut super::Renderer) {
    r.sql.push_str(" VALUES ");
    for (i, row) in insert.values.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        r.sql.push('(');
        for (j, val) in row.iter().enumerate() {
            if j > 0 {
                r.sql.push_str(", ");
            }
            val.render(r);
        }
        r.sql.push(')');
    }
}

fn render_on_conflict(on_conflict: &OnConflict, r: &mut super::Renderer) {
    if on_conflict.columns.is_empty() {
        return;
    }

    r.sql.push_str(" ON CONFLICT (");
    let quoted: Vec<String> = on_conflict
        .columns
        .iter()
        .map(|c| r.dialect.quote_identifier(c))
        .collect();
    r.sql.push_str(&quoted.join(", "));
    r.sql.push(')');

    let ConflictAction::DoUpdate { assignments } = &on_conflict.action;
    if assignments.is_empty() {
        r.sql.push_str(" DO NOTHING");
        return;
    }

    r.sql.push_str(" DO UPDATE SET ");
    for (i, assignment) in assignments.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        r.sql
            .push_str(&r.dialect.quote_identifier(&assignment.column));
        r.sql.push_str(" = ");
        assignment.value.render(r);
    }
}

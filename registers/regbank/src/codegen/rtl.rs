// Licensed under the Apache-2.0 license

//! SystemVerilog register file emission.
//!
//! For a bank named "can_aximm" the generated module looks like:
//!
//! ```text
//! module can_aximm_regbank (
//!     input  logic        clk_i,
//!     input  logic        rst_n_i,
//!     input  logic [31:0] addr_i,
//!     ...
//!     input  logic        irq_rx_data_irq_set_i,
//!     output logic        irq_rx_data_irq_o,
//!     ...
//! );
//!     // address decode: <reg>_sel, <reg>_wr, <reg>_rd
//!     // one always_ff block per stored field
//!     // always_comb read-data mux, unmapped addresses return a constant
//! endmodule
//! ```

use crate::config::GeneratorConfig;
use crate::model::{Field, Register, RegisterBank};
use crate::semantics::{FieldBehavior, PortDir, PortRole, ReadSource, RegisterSignals, WriteEffect};
use crate::util::sv_literal;

const INDENT: &str = "    ";

enum PortLine {
    Comment(String),
    Decl(String),
}

pub(super) struct RtlWriter<'a> {
    bank: &'a RegisterBank,
    config: &'a GeneratorConfig,
    txt: String,
}

impl<'a> RtlWriter<'a> {
    pub(super) fn new(bank: &'a RegisterBank, config: &'a GeneratorConfig) -> Self {
        Self {
            bank,
            config,
            txt: String::with_capacity(16 * 1024),
        }
    }

    fn write(&mut self, string: &str) {
        self.txt.push_str(string);
    }

    fn line(&mut self, depth: usize, string: &str) {
        for _ in 0..depth {
            self.txt.push_str(INDENT);
        }
        self.txt.push_str(string);
        self.txt.push('\n');
    }

    pub(super) fn generate(mut self) -> String {
        let bank = self.bank;
        self.write("// File generated automatically by registers-regbank: DO NOT EDIT.\n");
        self.write(&format!(
            "// Bank {}: {}-bit word addresses, {}-bit data.\n\n",
            bank.name(),
            bank.address_width(),
            bank.data_width()
        ));
        self.gen_module_header();
        self.gen_decode();
        for reg in bank.registers() {
            for field in &reg.fields {
                self.gen_field(reg, field);
            }
        }
        self.gen_read_mux();
        self.write("endmodule\n");
        self.txt
    }

    //-----------------------------------------------------------------------------
    // Module header and port list
    //-----------------------------------------------------------------------------

    fn gen_module_header(&mut self) {
        let bank = self.bank;
        let aw = bank.address_width();
        let dw = bank.data_width();
        let mut lines = vec![
            PortLine::Decl(port_decl(PortDir::Input, "logic", "clk_i")),
            PortLine::Decl(port_decl(PortDir::Input, "logic", "rst_n_i")),
            PortLine::Comment("Bus interface".to_string()),
            PortLine::Decl(port_decl(PortDir::Input, &bus_type(aw), "addr_i")),
            PortLine::Decl(port_decl(PortDir::Input, &bus_type(dw), "wdata_i")),
            PortLine::Decl(port_decl(PortDir::Input, "logic", "wr_en_i")),
            PortLine::Decl(port_decl(PortDir::Input, "logic", "rd_en_i")),
            PortLine::Decl(port_decl(PortDir::Output, &bus_type(dw), "rdata_o")),
        ];

        for reg in bank.registers() {
            let ports: Vec<_> = reg
                .fields
                .iter()
                .flat_map(|f| FieldBehavior::expand(&reg.name, f).ports)
                .collect();
            if ports.is_empty() {
                continue;
            }
            lines.push(PortLine::Comment(format!(
                "Register {} @ {:#x}",
                reg.name, reg.address
            )));
            for port in ports {
                lines.push(PortLine::Decl(port_decl(
                    port.dir,
                    &logic_type(port.width),
                    &port.name,
                )));
            }
        }

        let last_decl = lines
            .iter()
            .rposition(|l| matches!(l, PortLine::Decl(_)))
            .unwrap_or(0);
        self.write(&format!(
            "module {} (\n",
            self.config.module_name(bank.name())
        ));
        for (i, line) in lines.iter().enumerate() {
            match line {
                PortLine::Comment(c) => self.line(1, &format!("// {c}")),
                PortLine::Decl(d) => {
                    let sep = if i == last_decl { "" } else { "," };
                    self.line(1, &format!("{d}{sep}"));
                }
            }
        }
        self.write(");\n\n");
    }

    //-----------------------------------------------------------------------------
    // Address decode
    //-----------------------------------------------------------------------------

    fn gen_decode(&mut self) {
        let bank = self.bank;
        if bank.register_count() == 0 {
            return;
        }
        self.line(1, "// Address decode");
        for reg in bank.registers() {
            let s = RegisterSignals::new(&reg.name);
            let addr = sv_literal(bank.address_width(), reg.address);
            self.line(1, &format!("logic {}, {}, {};", s.select, s.write, s.read));
            self.line(1, &format!("assign {} = (addr_i == {addr});", s.select));
            self.line(1, &format!("assign {} = {} & wr_en_i;", s.write, s.select));
            self.line(1, &format!("assign {} = {} & rd_en_i;", s.read, s.select));
        }
        self.write("\n");
    }

    //-----------------------------------------------------------------------------
    // Per-field storage and side effects
    //-----------------------------------------------------------------------------

    fn gen_field(&mut self, reg: &Register, field: &Field) {
        let b = FieldBehavior::expand(&reg.name, field);
        let s = RegisterSignals::new(&reg.name);

        self.line(
            1,
            &format!("// {}.{}: {}", reg.name, field.name, field.access_kind),
        );
        if self.config.emit_descriptions {
            for desc in field
                .description
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
            {
                self.line(1, &format!("// {desc}"));
            }
        }

        if !b.has_storage() {
            // ReadOnly: the input feeds the read mux directly.
            self.write("\n");
            return;
        }

        let q = b.storage_signal();
        let slice = format!("wdata_i[{}:{}]", b.msb(), b.lsb);
        let zero = sv_literal(b.width, 0);
        let reset = sv_literal(b.width, b.reset_value & b.mask());
        self.line(1, &format!("{} {q};", logic_type(b.width)));
        if b.activity_signal {
            self.line(1, &format!("logic {};", b.read_strobe_signal()));
            self.line(1, &format!("logic {};", b.write_strobe_signal()));
        }
        self.line(1, "always_ff @(posedge clk_i or negedge rst_n_i) begin");
        self.line(2, "if (!rst_n_i) begin");
        self.line(3, &format!("{q} <= {reset};"));
        if b.activity_signal {
            self.line(3, &format!("{} <= 1'b0;", b.read_strobe_signal()));
            self.line(3, &format!("{} <= 1'b0;", b.write_strobe_signal()));
        }
        self.line(2, "end else begin");
        match b.write {
            WriteEffect::Load | WriteEffect::Push => {
                self.line(3, &format!("if ({}) begin", s.write));
                self.line(4, &format!("{q} <= {slice};"));
                self.line(3, "end");
            }
            WriteEffect::ClearOnOne => {
                let set = b
                    .port(PortRole::Set)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| zero.clone());
                self.line(
                    3,
                    &format!(
                        "{q} <= ({q} & ~({} ? {slice} : {zero})) | {set};",
                        s.write
                    ),
                );
            }
            WriteEffect::PulseOnOne => {
                self.line(3, &format!("{q} <= {} ? {slice} : {zero};", s.write));
            }
            WriteEffect::Ignore => {}
        }
        if b.activity_signal {
            self.line(3, &format!("{} <= {};", b.read_strobe_signal(), s.read));
            self.line(3, &format!("{} <= {};", b.write_strobe_signal(), s.write));
        }
        self.line(2, "end");
        self.line(1, "end");

        for port in b.ports.iter().filter(|p| p.dir == PortDir::Output) {
            let source = match port.role {
                PortRole::ReadStrobe => b.read_strobe_signal(),
                PortRole::WriteStrobe => b.write_strobe_signal(),
                PortRole::Value | PortRole::Pulse | PortRole::WriteData => q.clone(),
                PortRole::Set | PortRole::ReadData => continue,
            };
            self.line(1, &format!("assign {} = {source};", port.name));
        }
        self.write("\n");
    }

    //-----------------------------------------------------------------------------
    // Read data mux
    //-----------------------------------------------------------------------------

    fn gen_read_mux(&mut self) {
        let bank = self.bank;
        let dw = bank.data_width();
        let unmapped = sv_literal(dw, self.config.unmapped_read_value & bank.data_mask());

        self.line(1, "// Read data");
        self.line(1, "always_comb begin");
        self.line(2, &format!("rdata_o = {};", sv_literal(dw, 0)));
        if bank.register_count() == 0 {
            self.line(2, &format!("rdata_o = {unmapped};"));
            self.line(1, "end");
            return;
        }
        self.line(2, "case (addr_i)");
        for reg in bank.registers() {
            let addr = sv_literal(bank.address_width(), reg.address);
            self.line(3, &format!("{addr}: begin"));
            for field in &reg.fields {
                let b = FieldBehavior::expand(&reg.name, field);
                let source = match b.read {
                    ReadSource::HardwareInput => match b.input_port() {
                        Some(p) => p.name.clone(),
                        None => continue,
                    },
                    ReadSource::Storage => b.storage_signal(),
                    ReadSource::Zero => continue,
                };
                self.line(
                    4,
                    &format!("rdata_o[{}:{}] = {source};", b.msb(), b.lsb),
                );
            }
            self.line(3, "end");
        }
        self.line(3, &format!("default: rdata_o = {unmapped};"));
        self.line(2, "endcase");
        self.line(1, "end");
        self.write("\n");
    }
}

fn port_decl(dir: PortDir, ty: &str, name: &str) -> String {
    let dir = match dir {
        PortDir::Input => "input ",
        PortDir::Output => "output",
    };
    format!("{dir} {ty:<12} {name}")
}

/// Bus ports are always declared as vectors, even when one bit wide.
fn bus_type(width: u32) -> String {
    format!("logic [{}:0]", width - 1)
}

fn logic_type(width: u32) -> String {
    if width == 1 {
        "logic".to_string()
    } else {
        format!("logic [{}:0]", width - 1)
    }
}

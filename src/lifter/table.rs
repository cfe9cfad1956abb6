/*!
table.rs - the canonical NMOS 6502 opcode matrix: `opcode -> (mnemonic,
addressing mode, encoded length)`. Descriptive data the lifter's tests
and callers can use to decode a raw byte without a full disassembler;
building the disassembler itself is out of scope here.

Undocumented/illegal opcodes are out of scope; `decode` returns `None`
for every opcode not listed here.
*/

use super::{AddressingMode, Mnemonic};

/// Looks up a documented opcode's `(mnemonic, mode, length_in_bytes)`.
pub fn decode(opcode: u8) -> Option<(Mnemonic, AddressingMode, u8)> {
    use AddressingMode::*;
    use Mnemonic::*;
    Some(match opcode {
        // ADC
        0x69 => (Adc, Immediate, 2),
        0x65 => (Adc, ZeroPage, 2),
        0x75 => (Adc, ZeroPageX, 2),
        0x6D => (Adc, Absolute, 3),
        0x7D => (Adc, AbsoluteX, 3),
        0x79 => (Adc, AbsoluteY, 3),
        0x61 => (Adc, IndexedIndirect, 2),
        0x71 => (Adc, IndirectIndexed, 2),

        // AND
        0x29 => (And, Immediate, 2),
        0x25 => (And, ZeroPage, 2),
        0x35 => (And, ZeroPageX, 2),
        0x2D => (And, Absolute, 3),
        0x3D => (And, AbsoluteX, 3),
        0x39 => (And, AbsoluteY, 3),
        0x21 => (And, IndexedIndirect, 2),
        0x31 => (And, IndirectIndexed, 2),

        // ASL
        0x0A => (Asl, Accumulator, 1),
        0x06 => (Asl, ZeroPage, 2),
        0x16 => (Asl, ZeroPageX, 2),
        0x0E => (Asl, Absolute, 3),
        0x1E => (Asl, AbsoluteX, 3),

        // Branches (all relative, 2 bytes)
        0x90 => (Bcc, Relative, 2),
        0xB0 => (Bcs, Relative, 2),
        0xF0 => (Beq, Relative, 2),
        0x30 => (Bmi, Relative, 2),
        0xD0 => (Bne, Relative, 2),
        0x10 => (Bpl, Relative, 2),
        0x50 => (Bvc, Relative, 2),
        0x70 => (Bvs, Relative, 2),

        // BIT
        0x24 => (Bit, ZeroPage, 2),
        0x2C => (Bit, Absolute, 3),

        // BRK
        0x00 => (Brk, Implied, 1),

        // Flag clear/set (implied)
        0x18 => (Clc, Implied, 1),
        0xD8 => (Cld, Implied, 1),
        0x58 => (Cli, Implied, 1),
        0xB8 => (Clv, Implied, 1),
        0x38 => (Sec, Implied, 1),
        0xF8 => (Sed, Implied, 1),
        0x78 => (Sei, Implied, 1),

        // CMP
        0xC9 => (Cmp, Immediate, 2),
        0xC5 => (Cmp, ZeroPage, 2),
        0xD5 => (Cmp, ZeroPageX, 2),
        0xCD => (Cmp, Absolute, 3),
        0xDD => (Cmp, AbsoluteX, 3),
        0xD9 => (Cmp, AbsoluteY, 3),
        0xC1 => (Cmp, IndexedIndirect, 2),
        0xD1 => (Cmp, IndirectIndexed, 2),

        // CPX / CPY
        0xE0 => (Cpx, Immediate, 2),
        0xE4 => (Cpx, ZeroPage, 2),
        0xEC => (Cpx, Absolute, 3),
        0xC0 => (Cpy, Immediate, 2),
        0xC4 => (Cpy, ZeroPage, 2),
        0xCC => (Cpy, Absolute, 3),

        // DEC / DEX / DEY
        0xC6 => (Dec, ZeroPage, 2),
        0xD6 => (Dec, ZeroPageX, 2),
        0xCE => (Dec, Absolute, 3),
        0xDE => (Dec, AbsoluteX, 3),
        0xCA => (Dex, Implied, 1),
        0x88 => (Dey, Implied, 1),

        // EOR
        0x49 => (Eor, Immediate, 2),
        0x45 => (Eor, ZeroPage, 2),
        0x55 => (Eor, ZeroPageX, 2),
        0x4D => (Eor, Absolute, 3),
        0x5D => (Eor, AbsoluteX, 3),
        0x59 => (Eor, AbsoluteY, 3),
        0x41 => (Eor, IndexedIndirect, 2),
        0x51 => (Eor, IndirectIndexed, 2),

        // INC / INX / INY
        0xE6 => (Inc, ZeroPage, 2),
        0xF6 => (Inc, ZeroPageX, 2),
        0xEE => (Inc, Absolute, 3),
        0xFE => (Inc, AbsoluteX, 3),
        0xE8 => (Inx, Implied, 1),
        0xC8 => (Iny, Implied, 1),

        // JMP / JSR
        0x4C => (Jmp, Absolute, 3),
        0x6C => (Jmp, Indirect, 3),
        0x20 => (Jsr, Absolute, 3),

        // LDA
        0xA9 => (Lda, Immediate, 2),
        0xA5 => (Lda, ZeroPage, 2),
        0xB5 => (Lda, ZeroPageX, 2),
        0xAD => (Lda, Absolute, 3),
        0xBD => (Lda, AbsoluteX, 3),
        0xB9 => (Lda, AbsoluteY, 3),
        0xA1 => (Lda, IndexedIndirect, 2),
        0xB1 => (Lda, IndirectIndexed, 2),

        // LDX
        0xA2 => (Ldx, Immediate, 2),
        0xA6 => (Ldx, ZeroPage, 2),
        0xB6 => (Ldx, ZeroPageY, 2),
        0xAE => (Ldx, Absolute, 3),
        0xBE => (Ldx, AbsoluteY, 3),

        // LDY
        0xA0 => (Ldy, Immediate, 2),
        0xA4 => (Ldy, ZeroPage, 2),
        0xB4 => (Ldy, ZeroPageX, 2),
        0xAC => (Ldy, Absolute, 3),
        0xBC => (Ldy, AbsoluteX, 3),

        // LSR
        0x4A => (Lsr, Accumulator, 1),
        0x46 => (Lsr, ZeroPage, 2),
        0x56 => (Lsr, ZeroPageX, 2),
        0x4E => (Lsr, Absolute, 3),
        0x5E => (Lsr, AbsoluteX, 3),

        // NOP
        0xEA => (Nop, Implied, 1),

        // ORA
        0x09 => (Ora, Immediate, 2),
        0x05 => (Ora, ZeroPage, 2),
        0x15 => (Ora, ZeroPageX, 2),
        0x0D => (Ora, Absolute, 3),
        0x1D => (Ora, AbsoluteX, 3),
        0x19 => (Ora, AbsoluteY, 3),
        0x01 => (Ora, IndexedIndirect, 2),
        0x11 => (Ora, IndirectIndexed, 2),

        // Stack / transfer
        0x48 => (Pha, Implied, 1),
        0x08 => (Php, Implied, 1),
        0x68 => (Pla, Implied, 1),
        0x28 => (Plp, Implied, 1),
        0xAA => (Tax, Implied, 1),
        0xA8 => (Tay, Implied, 1),
        0xBA => (Tsx, Implied, 1),
        0x8A => (Txa, Implied, 1),
        0x9A => (Txs, Implied, 1),
        0x98 => (Tya, Implied, 1),

        // ROL / ROR
        0x2A => (Rol, Accumulator, 1),
        0x26 => (Rol, ZeroPage, 2),
        0x36 => (Rol, ZeroPageX, 2),
        0x2E => (Rol, Absolute, 3),
        0x3E => (Rol, AbsoluteX, 3),
        0x6A => (Ror, Accumulator, 1),
        0x66 => (Ror, ZeroPage, 2),
        0x76 => (Ror, ZeroPageX, 2),
        0x6E => (Ror, Absolute, 3),
        0x7E => (Ror, AbsoluteX, 3),

        // RTI / RTS
        0x40 => (Rti, Implied, 1),
        0x60 => (Rts, Implied, 1),

        // SBC
        0xE9 => (Sbc, Immediate, 2),
        0xE5 => (Sbc, ZeroPage, 2),
        0xF5 => (Sbc, ZeroPageX, 2),
        0xED => (Sbc, Absolute, 3),
        0xFD => (Sbc, AbsoluteX, 3),
        0xF9 => (Sbc, AbsoluteY, 3),
        0xE1 => (Sbc, IndexedIndirect, 2),
        0xF1 => (Sbc, IndirectIndexed, 2),

        // STA (no immediate form)
        0x85 => (Sta, ZeroPage, 2),
        0x95 => (Sta, ZeroPageX, 2),
        0x8D => (Sta, Absolute, 3),
        0x9D => (Sta, AbsoluteX, 3),
        0x99 => (Sta, AbsoluteY, 3),
        0x81 => (Sta, IndexedIndirect, 2),
        0x91 => (Sta, IndirectIndexed, 2),

        // STX / STY
        0x86 => (Stx, ZeroPage, 2),
        0x96 => (Stx, ZeroPageY, 2),
        0x8E => (Stx, Absolute, 3),
        0x84 => (Sty, ZeroPage, 2),
        0x94 => (Sty, ZeroPageX, 2),
        0x8C => (Sty, Absolute, 3),

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lda_immediate_decodes() {
        assert_eq!(decode(0xA9), Some((Mnemonic::Lda, AddressingMode::Immediate, 2)));
    }

    #[test]
    fn ldx_uses_zero_page_y_not_x() {
        assert_eq!(decode(0xB6), Some((Mnemonic::Ldx, AddressingMode::ZeroPageY, 2)));
        assert_eq!(decode(0xBE), Some((Mnemonic::Ldx, AddressingMode::AbsoluteY, 3)));
    }

    #[test]
    fn sta_has_no_immediate_form() {
        assert_eq!(decode(0x89), None);
    }

    #[test]
    fn every_documented_opcode_has_a_length_consistent_with_its_mode() {
        for opcode in 0u8..=255 {
            if let Some((_, mode, len)) = decode(opcode) {
                let expected = match mode {
                    AddressingMode::Implied | AddressingMode::Accumulator => 1,
                    AddressingMode::Immediate
                    | AddressingMode::ZeroPage
                    | AddressingMode::ZeroPageX
                    | AddressingMode::ZeroPageY
                    | AddressingMode::IndexedIndirect
                    | AddressingMode::IndirectIndexed
                    | AddressingMode::Relative => 2,
                    AddressingMode::Absolute
                    | AddressingMode::AbsoluteX
                    | AddressingMode::AbsoluteY
                    | AddressingMode::Indirect => 3,
                };
                assert_eq!(len, expected, "opcode {opcode:#04X}");
            }
        }
    }

    #[test]
    fn illegal_opcode_decodes_to_none() {
        assert_eq!(decode(0x02), None);
    }
}
